// Domain layer: core models and ports (interfaces) shared by the SOAP adapter and its hosts.

pub mod model;
pub mod ports;
