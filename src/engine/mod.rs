// engine module: CMS backend engine

pub mod http;
mod interface;
pub mod stub;

pub use http::HttpEngine;
pub use interface::{CollectionKind, Engine, EngineHandle, Event, Request};
pub use stub::StubEngine;
