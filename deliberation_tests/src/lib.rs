#![cfg(test)]

mod common;

mod comments;
mod communities;
mod issues;
mod proposals;
