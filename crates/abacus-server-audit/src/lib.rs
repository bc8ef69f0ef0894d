// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

pub mod buffer;
pub mod emit;
pub mod error;
pub mod event;
pub mod pipeline;
pub mod sink;

pub use buffer::EventBuffer;
pub use emit::RequestContext;
pub use error::AuditSinkError;
pub use event::{AuditEvent, AuditEventBuilder, AuditEventType, AuditSeverity, UserId};
pub use pipeline::AuditService;
pub use sink::{AuditSink, MemoryAuditSink};

pub use abacus_server_config::AuditConfig;

#[cfg(feature = "sink-sqlite")]
pub use sink::sqlite::SqliteAuditSink;
