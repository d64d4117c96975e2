pub mod context;
pub mod ids;
pub mod middleware;
pub mod path;
pub mod pattern;
pub mod request;
pub mod response;
pub mod route;
pub mod router;
pub mod server;
pub mod tree;

pub use request::{HeaderVec, Request, Scheme};
pub use response::Response;
pub use route::{Route, RouteBuilder};
pub use router::{Handler, Router, RouterError};
pub use tree::{RouteTree, NO_LEAF_ID};
