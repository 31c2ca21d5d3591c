use crate::libs::remote::BreakSettings;
use rusqlite::{params, Connection, OptionalExtension, Result};

const SELECT_SETTINGS: &str = "SELECT break_every_mins, break_duration_mins, long_pause_mins FROM break_settings WHERE user_id = ?1";
const UPSERT_SETTINGS: &str = "INSERT INTO break_settings (user_id, break_every_mins, break_duration_mins, long_pause_mins, updated_at)
     VALUES (?1, ?2, ?3, ?4, CURRENT_TIMESTAMP)
     ON CONFLICT(user_id) DO UPDATE SET
        break_every_mins = excluded.break_every_mins,
        break_duration_mins = excluded.break_duration_mins,
        long_pause_mins = excluded.long_pause_mins,
        updated_at = excluded.updated_at";

pub struct BreakSettingsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> BreakSettingsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        BreakSettingsRepo { conn }
    }

    pub fn fetch(&self, user_id: &str) -> Result<Option<BreakSettings>> {
        self.conn
            .query_row(SELECT_SETTINGS, params![user_id], |row| {
                Ok(BreakSettings {
                    break_every_mins: row.get(0)?,
                    break_duration_mins: row.get(1)?,
                    long_pause_mins: row.get(2)?,
                })
            })
            .optional()
    }

    pub fn save(&self, user_id: &str, settings: &BreakSettings) -> Result<()> {
        self.conn.execute(
            UPSERT_SETTINGS,
            params![
                user_id,
                settings.break_every_mins,
                settings.break_duration_mins,
                settings.long_pause_mins
            ],
        )?;

        Ok(())
    }
}
