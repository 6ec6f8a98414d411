// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fitrank Authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use chrono::{Duration, Utc};
use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use fitrank::{LeaderboardPeriod, PointSource, PointsEngine, UserId};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use tracing::{debug, warn};

/// Fitrank replay - rebuild a leaderboard from CSV exports
///
/// Reads a profiles CSV and a point-events CSV, replays the events through
/// the points engine (backdated timestamps supported), and writes the
/// resulting leaderboard to stdout.
#[derive(Parser, Debug)]
#[command(name = "fitrank")]
#[command(about = "Replays point events and prints the leaderboard", long_about = None)]
struct Args {
    /// Path to profiles CSV
    ///
    /// Expected format: name,last_name,picture
    /// Rows are assigned user ids 1..N in order.
    #[arg(value_name = "PROFILES")]
    profiles: PathBuf,

    /// Path to point-events CSV
    ///
    /// Expected format: user,delta,source,days_ago
    /// `days_ago` is optional and backdates the entry for window replay.
    #[arg(value_name = "EVENTS")]
    events: PathBuf,

    /// Ranking window
    #[arg(long, default_value = "last_30_days")]
    period: LeaderboardPeriod,

    /// Maximum number of ranked rows
    #[arg(long, default_value_t = 20)]
    limit: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let engine = PointsEngine::new();

    if let Err(e) = load_profiles(&engine, open(&args.profiles)) {
        eprintln!("Error reading profiles '{}': {}", args.profiles.display(), e);
        process::exit(1);
    }

    if let Err(e) = replay_events(&engine, open(&args.events)) {
        eprintln!("Error replaying events '{}': {}", args.events.display(), e);
        process::exit(1);
    }

    if let Err(e) = write_leaderboard(&engine, args.period, args.limit, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

fn open(path: &PathBuf) -> BufReader<File> {
    match File::open(path) {
        Ok(f) => BufReader::new(f),
        Err(e) => {
            eprintln!("Error opening file '{}': {}", path.display(), e);
            process::exit(1);
        }
    }
}

/// Raw CSV record for a profile row.
///
/// Fields: `name, last_name, picture`
#[derive(Debug, Deserialize)]
struct ProfileRecord {
    name: String,
    last_name: String,
    picture: Option<String>,
}

/// Raw CSV record for a point event.
///
/// Fields: `user, delta, source, days_ago`
#[derive(Debug, Deserialize)]
struct EventRecord {
    user: u64,
    delta: i64,
    source: String,
    days_ago: Option<i64>,
}

impl EventRecord {
    fn source(&self) -> Option<PointSource> {
        match self.source.to_lowercase().as_str() {
            "comment_on_post" => Some(PointSource::CommentOnPost),
            "comment_liked" => Some(PointSource::CommentLiked),
            "post_liked" => Some(PointSource::PostLiked),
            "comment_reply" => Some(PointSource::CommentReply),
            _ => None,
        }
    }
}

/// Registers one profile per CSV row, in row order.
///
/// Row order determines user ids (1..N), which is what the events file
/// references.
pub fn load_profiles<R: Read>(engine: &PointsEngine, reader: R) -> Result<(), csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    for result in rdr.deserialize::<ProfileRecord>() {
        match result {
            Ok(record) => {
                let picture = record.picture.filter(|p| !p.is_empty());
                engine.register_user(record.name, record.last_name, picture);
            }
            Err(e) => {
                warn!(error = %e, "skipping malformed profile row");
                continue;
            }
        }
    }

    Ok(())
}

/// Replays point events against the engine.
///
/// Malformed rows and unknown sources are skipped; failed recordings (e.g.
/// a user id outside the profiles file) are logged and skipped, matching
/// the best-effort semantics of live point recording.
pub fn replay_events<R: Read>(engine: &PointsEngine, reader: R) -> Result<(), csv::Error> {
    let now = Utc::now();

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    for result in rdr.deserialize::<EventRecord>() {
        match result {
            Ok(record) => {
                let Some(source) = record.source() else {
                    debug!(source = %record.source, "skipping event with unknown source");
                    continue;
                };

                let created_at = now - Duration::days(record.days_ago.unwrap_or(0));
                let user = UserId(record.user);
                if let Err(e) = engine.record_points_at(user, record.delta, source, created_at) {
                    warn!(%user, delta = record.delta, error = %e, "skipping event");
                }
            }
            Err(e) => {
                debug!(error = %e, "skipping malformed event row");
                continue;
            }
        }
    }

    Ok(())
}

/// Writes the ranked leaderboard as CSV.
///
/// Columns: `rank, user, name, last_name, level, total_points, period_points`
pub fn write_leaderboard<W: Write>(
    engine: &PointsEngine,
    period: LeaderboardPeriod,
    limit: usize,
    writer: W,
) -> Result<(), csv::Error> {
    let board = engine.leaderboard(period, limit);

    let mut wtr = Writer::from_writer(writer);
    wtr.write_record([
        "rank",
        "user",
        "name",
        "last_name",
        "level",
        "total_points",
        "period_points",
    ])?;

    for row in &board.users {
        wtr.write_record([
            row.rank.to_string(),
            row.user_id.to_string(),
            row.name.clone(),
            row.last_name.clone(),
            row.level.to_string(),
            row.total_points.to_string(),
            row.period_points.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
