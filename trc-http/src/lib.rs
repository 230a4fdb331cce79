//! HTTP federation collaborator for `trc`: the wire types and peer
//! `Search` implementation spec.md §6 describes as "external but
//! normative where federation is used." Server-side handlers that
//! expose a local `Collector` over HTTP are out of this crate's scope —
//! only the client side needed to federate with a peer lives here.

pub mod peer;
pub mod wire;

pub use peer::HttpSearch;
pub use wire::{WireEvent, WireFrame, WireSearchRequest, WireSearchResponse, WireTrace};
