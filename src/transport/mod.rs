//! Transport module - sorption, retardation and breakthrough modelling of
//! the contaminant plume through the wetland beds.

pub mod ade;
pub mod btc;
pub mod site;

pub use ade::AdeParameters;
pub use btc::{observed_points, BtcBuilder, TransportError};
pub use site::{CompoundProperties, SiteParameters};
