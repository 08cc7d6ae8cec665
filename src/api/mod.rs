// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod handlers;
pub mod server;

pub use server::build_router;
