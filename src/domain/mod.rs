// Domain layer: passport models and ports. Adapters and the transfer core depend on it, never the reverse.

pub mod model;
pub mod ports;
