//! SQLite-backed port catalog loader.
//!
//! Catalog ingestion is external to the core; deployments that ship the
//! catalog as a SQLite file use this loader to materialize a
//! [`PortCatalog`]. The loader validates that the expected `Ports` table and
//! columns exist before querying, and skips rows that fail catalog
//! validation rather than propagating corrupt entries into the graph.

use std::path::Path;

use rusqlite::{Connection, Row};
use tracing::{debug, warn};

use crate::catalog::PortCatalog;
use crate::error::{Error, Result};
use crate::geo::Position;
use crate::port::{CanalAccess, Port, PortStatus, PortType, SeaArea, VesselLimits};

const REQUIRED_COLUMNS: &[&str] = &[
    "code",
    "name",
    "country",
    "lat",
    "lon",
    "port_type",
    "status",
    "sea_area",
    "max_length_m",
    "max_beam_m",
    "max_draft_m",
    "berth_count",
    "congestion_factor",
    "average_port_stay_hours",
    "services",
    "suez_access",
    "panama_access",
];

/// Load the port catalog from a SQLite database file.
///
/// The catalog version is read from a single-row `CatalogMeta(version)`
/// table when present, defaulting to 1.
pub fn load_catalog(db_path: &Path) -> Result<PortCatalog> {
    let connection = Connection::open(db_path)?;
    load_catalog_from_connection(&connection)
}

/// Load the port catalog from an open connection.
pub fn load_catalog_from_connection(connection: &Connection) -> Result<PortCatalog> {
    if !table_exists(connection, "Ports")? || !table_has_columns(connection, "Ports", REQUIRED_COLUMNS)? {
        return Err(Error::UnsupportedSchema);
    }

    let version = read_catalog_version(connection)?;
    debug!(version, "loading port catalog");

    let mut stmt = connection.prepare(
        "SELECT code, name, country, lat, lon, port_type, status, sea_area, \
                max_length_m, max_beam_m, max_draft_m, berth_count, congestion_factor, \
                average_port_stay_hours, services, suez_access, panama_access \
         FROM Ports",
    )?;
    let rows = stmt.query_map([], row_to_port)?;

    let mut ports = Vec::new();
    let mut skipped = 0usize;
    for entry in rows {
        let port = entry?;
        match port.validate() {
            Ok(()) => ports.push(port),
            Err(error) => {
                skipped += 1;
                warn!(code = %port.code, %error, "skipping invalid catalog row");
            }
        }
    }

    if skipped > 0 {
        warn!(skipped, "ignored catalog rows that failed validation");
    }

    PortCatalog::from_ports(ports, version)
}

fn read_catalog_version(connection: &Connection) -> Result<u64> {
    if !table_exists(connection, "CatalogMeta")? {
        return Ok(1);
    }
    let version: i64 = connection.query_row("SELECT version FROM CatalogMeta LIMIT 1", [], |row| {
        row.get(0)
    })?;
    Ok(version.max(1) as u64)
}

fn row_to_port(row: &Row<'_>) -> rusqlite::Result<Port> {
    let services: Option<String> = row.get(14)?;
    Ok(Port {
        code: row.get(0)?,
        name: row.get(1)?,
        country: row.get(2)?,
        position: Position::new(row.get(3)?, row.get(4)?),
        port_type: parse_port_type(&row.get::<_, String>(5)?),
        status: parse_status(&row.get::<_, String>(6)?),
        sea_area: parse_sea_area(&row.get::<_, String>(7)?),
        limits: VesselLimits {
            max_length_m: row.get(8)?,
            max_beam_m: row.get(9)?,
            max_draft_m: row.get(10)?,
        },
        berth_count: row.get::<_, i64>(11)?.max(0) as u32,
        congestion_factor: row.get(12)?,
        average_port_stay_hours: row.get(13)?,
        services: services
            .map(|s| {
                s.split(',')
                    .map(|item| item.trim().to_string())
                    .filter(|item| !item.is_empty())
                    .collect()
            })
            .unwrap_or_default(),
        canal_access: CanalAccess {
            suez: row.get::<_, Option<bool>>(15)?.unwrap_or(false),
            panama: row.get::<_, Option<bool>>(16)?.unwrap_or(false),
        },
    })
}

fn parse_port_type(value: &str) -> PortType {
    match value.to_ascii_lowercase().as_str() {
        "container" => PortType::Container,
        "bulk" => PortType::Bulk,
        "tanker" => PortType::Tanker,
        "passenger" => PortType::Passenger,
        "fishing" => PortType::Fishing,
        _ => PortType::Multipurpose,
    }
}

fn parse_status(value: &str) -> PortStatus {
    match value.to_ascii_lowercase().as_str() {
        "restricted" => PortStatus::Restricted,
        "maintenance" => PortStatus::Maintenance,
        "inactive" => PortStatus::Inactive,
        _ => PortStatus::Active,
    }
}

fn parse_sea_area(value: &str) -> SeaArea {
    match value.to_ascii_lowercase().as_str() {
        "pacific" => SeaArea::Pacific,
        "red_sea" => SeaArea::RedSea,
        "mediterranean" => SeaArea::Mediterranean,
        "north_atlantic" => SeaArea::NorthAtlantic,
        "south_atlantic" => SeaArea::SouthAtlantic,
        _ => SeaArea::Indian,
    }
}

fn table_exists(connection: &Connection, table: &str) -> Result<bool> {
    let mut stmt = connection
        .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 LIMIT 1")?;
    let mut rows = stmt.query([table])?;
    Ok(rows.next()?.is_some())
}

fn table_has_columns(connection: &Connection, table: &str, required: &[&str]) -> Result<bool> {
    let pragma = format!("PRAGMA table_info('{table}')");
    let mut stmt = connection.prepare(&pragma)?;
    let mut rows = stmt.query([])?;

    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        columns.push(name);
    }

    Ok(required
        .iter()
        .all(|required| columns.iter().any(|column| column.eq_ignore_ascii_case(required))))
}
