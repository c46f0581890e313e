//! Network address resolution for lanbell.
//!
//! Answers one question: which IPv4 address should the beacon bind and
//! advertise? The answer comes from the active wireless interface, so a
//! machine that hops networks gets a fresh answer on every start instead of
//! a stale cached one.

mod address;

pub use address::{AddressSource, StaticAddressSource, WifiAddressSource};
