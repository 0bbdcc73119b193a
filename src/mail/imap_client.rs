use chrono::{DateTime, Utc};
use imap::types::Seq;
use log::{debug, info, warn};
use native_tls::TlsConnector;
use std::collections::HashSet;

use crate::domain::DateFilter;
use crate::error::{HarvestError, Result};
use crate::mail::source::HeaderSource;

type ImapSession = imap::Session<native_tls::TlsStream<std::net::TcpStream>>;

/// Only the fields the harvest needs; PEEK leaves \Seen untouched.
const HEADER_QUERY: &str = "(BODY.PEEK[HEADER.FIELDS (TO CC BCC DATE)])";

/// IMAPS mailbox that yields the header blocks of one folder.
pub struct ImapClient {
    pub server: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub folder: String,
}

impl ImapClient {
    pub fn new(
        server: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
        folder: impl Into<String>,
    ) -> Self {
        Self {
            server: server.into(),
            port,
            user: user.into(),
            password: password.into(),
            folder: folder.into(),
        }
    }

    fn connect_and_login(&self) -> Result<ImapSession> {
        let connect_err = |reason: String| HarvestError::Connect {
            server: self.server.clone(),
            port: self.port,
            reason,
        };

        debug!("Connecting to {}:{}", self.server, self.port);
        let tls = TlsConnector::builder()
            .build()
            .map_err(|e| connect_err(e.to_string()))?;
        let client = imap::connect((self.server.as_str(), self.port), self.server.as_str(), &tls)
            .map_err(|e| connect_err(e.to_string()))?;

        client
            .login(&self.user, &self.password)
            .map_err(|(e, _client)| HarvestError::Login {
                user: self.user.clone(),
                reason: e.to_string(),
            })
    }

    fn fetch_in_session(
        &self,
        session: &mut ImapSession,
        filter: &DateFilter,
    ) -> Result<Vec<Vec<u8>>> {
        let mailbox = session
            .examine(&self.folder)
            .map_err(|e| HarvestError::Select {
                folder: self.folder.clone(),
                reason: e.to_string(),
            })?;
        debug!("{} has {} messages", self.folder, mailbox.exists);

        let query = build_search_query(filter);
        debug!("SEARCH {query}");
        let Some(set) = seq_set(session.search(&query), mailbox.exists) else {
            return Ok(vec![]);
        };

        let fetches = session
            .fetch(&set, HEADER_QUERY)
            .map_err(|e| HarvestError::Fetch(e.to_string()))?;

        let mut blocks = Vec::with_capacity(fetches.len());
        for f in fetches.iter() {
            match f.header().or_else(|| f.body()) {
                Some(raw) => blocks.push(raw.to_vec()),
                None => debug!("Message {} returned no header section", f.message),
            }
        }
        Ok(blocks)
    }
}

impl HeaderSource for ImapClient {
    fn fetch_headers(&mut self, filter: &DateFilter) -> Result<Vec<Vec<u8>>> {
        let mut session = self.connect_and_login()?;
        let result = self.fetch_in_session(&mut session, filter);
        if let Err(e) = session.logout() {
            debug!("LOGOUT failed: {e}");
        }
        result
    }
}

/// Sequence set to fetch for a SEARCH outcome, or `None` when there is
/// nothing to fetch. A failed SEARCH falls back to the whole folder so the
/// date filter runs locally instead.
fn seq_set(found: imap::error::Result<HashSet<Seq>>, exists: u32) -> Option<String> {
    match found {
        Ok(found) if found.is_empty() => {
            warn!("no messages");
            None
        }
        Ok(found) => {
            info!("Number of messages to download: {}", found.len());
            let mut seqs: Vec<Seq> = found.into_iter().collect();
            seqs.sort_unstable();
            Some(
                seqs.iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join(","),
            )
        }
        Err(e) if exists == 0 => {
            warn!("cannot search messages ({e}), folder is empty: no messages");
            None
        }
        Err(e) => {
            warn!("cannot search messages, working with complete folder: {e}");
            Some("1:*".to_string())
        }
    }
}

/// `(SENTSINCE dd-Mon-yyyy [FROM "addr"])`; the epoch stands in for "no limit".
pub fn build_search_query(filter: &DateFilter) -> String {
    let since = DateTime::<Utc>::from_timestamp(filter.min_date.unwrap_or(0), 0)
        .unwrap_or_default()
        .format("%d-%b-%Y");

    let mut search = format!("SENTSINCE {since}");
    if let Some(from) = &filter.from_address {
        search.push_str(&format!(" FROM {}", quote_search_value(from)));
    }
    format!("({search})")
}

fn quote_search_value(value: &str) -> String {
    let escaped = value
        .replace(['\r', '\n'], " ")
        .replace('\\', "\\\\")
        .replace('"', "\\\"");
    format!("\"{escaped}\"")
}
