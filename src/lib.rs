//! # Yao OT
//!
//! The oblivious-transfer half of a two-party Yao garbled-circuit session.
//!
//! A garbler (the [`session::TransferCoordinator`]) hands the evaluator (the
//! [`session::TransferResponder`]) exactly one of the two wire labels of every
//! evaluator-owned input wire, using a Diffie-Hellman based 1-out-of-2 OT over a
//! prime-order [`group::Group`]. The evaluator then evaluates the garbled circuit
//! and reports the outputs back.
//!
//! Communication happens over anything implementing [`communication::BinarySend`]
//! and [`communication::BinaryReceive`]; TCP, websocket and in-memory transports
//! are provided.
#![recursion_limit = "1024"]

#[macro_use]
extern crate error_chain;

pub mod errors {
    // Create the Error, ErrorKind, ResultExt, and Result types
    error_chain! {
        foreign_links {
            Io(::std::io::Error);
            Websocket(::tungstenite::Error);
        }

        errors {
            InvalidElement {
                description("received group element is invalid")
                display("received group element is invalid")
            }
            InvalidGroup(reason: String) {
                description("invalid group parameters")
                display("invalid group parameters: {}", reason)
            }
            GroupMismatch {
                description("parties disagree on the group")
                display("parties disagree on the group (fingerprint or kind mismatch)")
            }
            CommunicationError {
                description("Error while communicating")
                display("Error while communicating")
            }
            ChannelClosed {
                description("peer closed the channel")
                display("peer closed the channel")
            }
            Timeout {
                description("timed out waiting for the peer")
                display("timed out waiting for the peer")
            }
            MalformedMessage(what: String) {
                description("received a malformed message")
                display("received a malformed message: {}", what)
            }
            UnknownWire(wire: crate::garble::WireId) {
                description("peer announced an unknown wire")
                display("peer announced unknown wire {}", wire)
            }
            DuplicateWire(wire: crate::garble::WireId) {
                description("peer announced a wire twice")
                display("peer announced wire {} more than once", wire)
            }
            WireCountMismatch(expected: usize, announced: usize) {
                description("parties disagree on the number of transferred wires")
                display("garbler transfers {} wires but evaluator owns {}", announced, expected)
            }
            ModeMismatch(local: crate::session::TransferMode, remote: crate::session::TransferMode) {
                description("parties disagree on the transfer mode")
                display("transfer mode mismatch: local {:?}, remote {:?}", local, remote)
            }
            LengthMismatch(left: usize, right: usize) {
                description("byte strings differ in length")
                display("byte strings differ in length: {} vs {}", left, right)
            }
            MissingWire(wire: crate::garble::WireId) {
                description("no label for wire")
                display("no label available for wire {}", wire)
            }
            InvalidCircuit(reason: String) {
                description("circuit is malformed")
                display("circuit is malformed: {}", reason)
            }
        }
    }
}

pub mod base_ot;
pub mod common;
pub mod communication;
pub mod garble;
pub mod group;
pub mod session;
