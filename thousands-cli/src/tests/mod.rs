//! Shared test harness modules for the Thousands CLI.

use super::*;

mod helpers;
mod pipeline;
