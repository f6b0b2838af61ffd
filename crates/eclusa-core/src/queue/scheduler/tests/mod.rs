use super::*;

use tokio::sync::oneshot;

mod common;
use common::*;
