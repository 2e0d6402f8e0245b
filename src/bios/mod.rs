//! # BIOS module
//!
//! This module is a place for the middleware between flat sector images and
//! physical tracks.  At present this is only the sector skew tables.

pub mod skew;
