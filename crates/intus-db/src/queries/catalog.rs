use anyhow::Result;
use rusqlite::{OptionalExtension, Row};

use intus_types::models::{ResourceLink, ResourceType, Scenario, ScenarioType, Tool, ToolType};

use crate::Database;
use crate::queries::{enum_column, string_list_column};

// Reference data is read-only and maps 1:1 onto the API models, so these
// queries return intus-types models directly.

impl Database {
    // -- Tools --

    pub fn list_tools(&self, kind: Option<ToolType>) -> Result<Vec<Tool>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, type, description, duration_min, steps FROM tools
                 WHERE ?1 IS NULL OR type = ?1
                 ORDER BY id",
            )?;
            let rows = stmt
                .query_map([kind.map(|k| k.as_str())], tool_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_tool(&self, id: &str) -> Result<Option<Tool>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, title, type, description, duration_min, steps FROM tools WHERE id = ?1",
                    [id],
                    tool_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    // -- Scenarios --

    pub fn list_scenarios(&self, kind: Option<ScenarioType>) -> Result<Vec<Scenario>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, type, title, description, steps, created_at FROM scenarios
                 WHERE ?1 IS NULL OR type = ?1
                 ORDER BY id",
            )?;
            let rows = stmt
                .query_map([kind.map(|k| k.as_str())], scenario_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_scenario(&self, id: &str) -> Result<Option<Scenario>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, type, title, description, steps, created_at FROM scenarios WHERE id = ?1",
                    [id],
                    scenario_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    // -- Resources --

    pub fn list_resources(&self, kind: Option<ResourceType>) -> Result<Vec<ResourceLink>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, description, type, phone, url FROM resources
                 WHERE ?1 IS NULL OR type = ?1
                 ORDER BY id",
            )?;
            let rows = stmt
                .query_map([kind.map(|k| k.as_str())], resource_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn tool_from_row(row: &Row<'_>) -> rusqlite::Result<Tool> {
    Ok(Tool {
        id: row.get(0)?,
        title: row.get(1)?,
        kind: enum_column(row, 2)?,
        description: row.get(3)?,
        duration_min: row.get(4)?,
        steps: string_list_column(row, 5)?,
    })
}

fn scenario_from_row(row: &Row<'_>) -> rusqlite::Result<Scenario> {
    Ok(Scenario {
        id: row.get(0)?,
        kind: enum_column(row, 1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        steps: string_list_column(row, 4)?,
        created_at: row.get(5)?,
    })
}

fn resource_from_row(row: &Row<'_>) -> rusqlite::Result<ResourceLink> {
    Ok(ResourceLink {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        kind: enum_column(row, 3)?,
        phone: row.get(4)?,
        url: row.get(5)?,
    })
}
