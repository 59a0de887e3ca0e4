// Domain layer: breach models and the ports the scan loop drives.

pub mod model;
pub mod ports;
