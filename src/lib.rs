//! Touchless mouse and keyboard: hand landmarks in, OS input events out.

pub mod action;
pub mod config;
pub mod controller;
pub mod geometry;
pub mod input;
pub mod session;
pub mod skeleton;
pub mod source;
pub mod tracker;
pub mod translator;
