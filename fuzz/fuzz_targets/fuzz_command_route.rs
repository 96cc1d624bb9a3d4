//! Fuzz target: `parse_route`
//!
//! Drives arbitrary request paths through the gateway router and asserts
//! that it never panics, that anything accepted maps back to a route or
//! command name, and that a rejection always encodes as a 400 JSON body.
//!
//! cargo fuzz run fuzz_command_route

#![no_main]

use libfuzzer_sys::fuzz_target;
use rgb_portal::app::commands::CommandResponse;
use rgb_portal::gateway::codec::{parse_route, route_for};

fuzz_target!(|data: &[u8]| {
    let Ok(path) = core::str::from_utf8(data) else {
        return;
    };

    match parse_route(path) {
        Ok(cmd) => {
            let route = route_for(cmd);
            assert_eq!(parse_route(route), Ok(cmd), "route table must round-trip");
        }
        Err(e) => {
            let response = CommandResponse::Rejected(e);
            assert_eq!(response.http_status(), 400);
            assert!(response.to_json().starts_with('{'));
        }
    }
});
