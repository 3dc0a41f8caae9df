//! Server-rendered frontend: the navigation header and the page shells it sits in.

pub mod header;
pub mod pages;
