pub mod listener;

use crate::proxy::dial::NetDialer;
use crate::proxy::relay::RelayHandler;
use crate::routing::Router;

/// Shared per-process state every connection handler needs.
pub struct ServerContext {
    pub router: Router,
    pub relay: RelayHandler<NetDialer>,
}
