//! Info command vocabulary layered over a raw transport.

use super::parse::{parse_info_map, parse_roster};
use super::InfoClient;
use crate::error::{Result, SafeStopError};
use crate::types::{ClusterStats, MemberConnection};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// Raw request/response transport: one info command in, one response out.
#[async_trait]
pub trait InfoTransport: Send + Sync {
    async fn request(&self, conn: &MemberConnection, command: &str) -> Result<String>;
}

/// [`InfoClient`] implementation speaking info commands over `T`.
pub struct InfoCommands<T> {
    transport: T,
}

impl<T: InfoTransport> InfoCommands<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn request(&self, conn: &MemberConnection, command: &str) -> Result<String> {
        debug!(host = %conn.endpoint(), command, "Info request");
        let response = self.transport.request(conn, command).await?;
        Ok(response.trim().to_string())
    }

    /// Send a command that must be acknowledged with one of `accepted`.
    async fn acknowledge(
        &self,
        conn: &MemberConnection,
        command: &str,
        accepted: &[&str],
    ) -> Result<()> {
        let response = self.request(conn, command).await?;
        if accepted.iter().any(|a| response.eq_ignore_ascii_case(a)) {
            Ok(())
        } else {
            Err(SafeStopError::info_query(
                conn.endpoint(),
                command,
                format!("unexpected response '{}'", response),
            ))
        }
    }

    async fn namespace_stats(
        &self,
        conn: &MemberConnection,
        namespace: &str,
    ) -> Result<HashMap<String, String>> {
        let command = format!("namespace/{}", namespace);
        let response = self.request(conn, &command).await?;
        parse_response(&response, conn, &command, ';', '=')
    }

    async fn namespace_flag(
        &self,
        conn: &MemberConnection,
        namespace: &str,
        flag: &str,
    ) -> Result<()> {
        let stats = self.namespace_stats(conn, namespace).await?;
        match stats.get(flag).map(String::as_str) {
            Some("true") => Ok(()),
            other => Err(SafeStopError::info_query(
                conn.endpoint(),
                format!("namespace/{}", namespace),
                format!("{} is {}", flag, other.unwrap_or("missing")),
            )),
        }
    }
}

/// Parse a response map, attributing malformed items to the command that produced them.
fn parse_response(
    response: &str,
    conn: &MemberConnection,
    command: &str,
    del: char,
    sep: char,
) -> Result<HashMap<String, String>> {
    parse_info_map(response, del, sep).map_err(|e| match e {
        SafeStopError::InfoParse(reason) => {
            SafeStopError::info_query(conn.endpoint(), command, reason)
        }
        other => other,
    })
}

fn required_field<'a>(
    map: &'a HashMap<String, String>,
    conn: &MemberConnection,
    command: &str,
    key: &str,
) -> Result<&'a str> {
    map.get(key).map(String::as_str).ok_or_else(|| {
        SafeStopError::info_query(conn.endpoint(), command, format!("missing {}", key))
    })
}

fn parse_field<N: std::str::FromStr>(
    map: &HashMap<String, String>,
    conn: &MemberConnection,
    command: &str,
    key: &str,
) -> Result<N> {
    let raw = required_field(map, conn, command, key)?;
    raw.parse().map_err(|_| {
        SafeStopError::info_query(conn.endpoint(), command, format!("invalid {} '{}'", key, raw))
    })
}

#[async_trait]
impl<T: InfoTransport> InfoClient for InfoCommands<T> {
    async fn namespaces(&self, conn: &MemberConnection) -> Result<Vec<String>> {
        let response = self.request(conn, "namespaces").await?;
        Ok(response
            .split(';')
            .map(str::trim)
            .filter(|ns| !ns.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn is_strong_consistency(
        &self,
        conn: &MemberConnection,
        namespace: &str,
    ) -> Result<bool> {
        let stats = self.namespace_stats(conn, namespace).await?;
        Ok(stats
            .get("strong-consistency")
            .map(|v| v == "true")
            .unwrap_or(false))
    }

    async fn roster(&self, conn: &MemberConnection, namespace: &str) -> Result<BTreeSet<String>> {
        let command = format!("roster:namespace={}", namespace);
        let response = self.request(conn, &command).await?;
        let fields = parse_response(&response, conn, &command, ':', '=')?;
        Ok(parse_roster(required_field(&fields, conn, &command, "roster")?))
    }

    async fn node_id(&self, conn: &MemberConnection) -> Result<String> {
        let id = self.request(conn, "node").await?;
        if id.is_empty() {
            return Err(SafeStopError::info_query(conn.endpoint(), "node", "empty node id"));
        }
        Ok(id)
    }

    async fn cluster_stats(&self, conn: &MemberConnection) -> Result<ClusterStats> {
        const COMMAND: &str = "statistics";
        let response = self.request(conn, COMMAND).await?;
        let stats = parse_response(&response, conn, COMMAND, ';', '=')?;

        Ok(ClusterStats {
            cluster_key: required_field(&stats, conn, COMMAND, "cluster_key")?.to_string(),
            cluster_size: parse_field(&stats, conn, COMMAND, "cluster_size")?,
            migrate_partitions_remaining: parse_field(
                &stats,
                conn,
                COMMAND,
                "migrate_partitions_remaining",
            )?,
        })
    }

    async fn quiesce(
        &self,
        all: &[MemberConnection],
        target: &MemberConnection,
        namespace: &str,
    ) -> Result<()> {
        self.acknowledge(target, "quiesce:", &["ok"]).await?;
        self.namespace_flag(target, namespace, "pending_quiesce").await?;

        for conn in all {
            self.acknowledge(conn, "recluster:", &["ok", "ignored-by-non-principal"])
                .await?;
        }

        self.namespace_flag(target, namespace, "effective_is_quiesced")
            .await?;
        info!(member = %target.member, namespace, "Member quiesced");
        Ok(())
    }

    async fn tip_hostname(&self, conn: &MemberConnection, host: &str, port: u16) -> Result<()> {
        let command = format!("tip:host={};port={}", host, port);
        self.acknowledge(conn, &command, &["ok"]).await
    }

    async fn tip_clear_hostname(
        &self,
        conn: &MemberConnection,
        host: &str,
        port: u16,
    ) -> Result<()> {
        let command = format!("tip-clear:host-port-list={}:{}", host, port);
        self.acknowledge(conn, &command, &["ok"]).await
    }

    async fn alumni_reset(&self, conn: &MemberConnection) -> Result<()> {
        self.acknowledge(conn, "services-alumni-reset", &["ok"]).await
    }
}
