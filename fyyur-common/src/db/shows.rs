//! Show database operations
//!
//! Shows are always read joined with their venue and artist as
//! [`ShowRecord`]s.

use crate::models::{EntityId, NewShow, ShowRecord};
use crate::time::format_start_time;
use crate::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};

const SHOW_SELECT: &str = r#"
    SELECT s.id, s.venue_id, v.name AS venue_name, v.image_link AS venue_image_link,
           s.artist_id, a.name AS artist_name, a.image_link AS artist_image_link,
           s.start_time
    FROM show s
    JOIN venue v ON v.id = s.venue_id
    JOIN artist a ON a.id = s.artist_id
"#;

/// Insert a show, returning its new id
///
/// Fails with [`Error::ReferentialIntegrity`] when the venue or artist does
/// not exist; nothing is written in that case.
pub async fn create_show(pool: &SqlitePool, show: &NewShow) -> Result<EntityId> {
    let mut tx = pool.begin().await?;

    let inserted =
        sqlx::query("INSERT INTO show (venue_id, artist_id, start_time) VALUES (?, ?, ?)")
            .bind(show.venue_id)
            .bind(show.artist_id)
            .bind(format_start_time(&show.start_time))
            .execute(&mut *tx)
            .await;

    let id = match inserted {
        Ok(result) => result.last_insert_rowid(),
        Err(e) => {
            let err = Error::from(e);
            if let Error::ReferentialIntegrity(_) = err {
                warn!(
                    venue_id = show.venue_id,
                    artist_id = show.artist_id,
                    "Rejected show with dangling reference"
                );
            }
            return Err(err);
        }
    };

    tx.commit().await?;

    info!(
        show_id = id,
        venue_id = show.venue_id,
        artist_id = show.artist_id,
        "Created show"
    );
    Ok(id)
}

/// Replace a show's venue, artist and start time
///
/// Same failure modes as [`create_show`]; an unknown id is
/// [`Error::NotFound`]. The row is left untouched on any failure.
pub async fn update_show(pool: &SqlitePool, id: EntityId, show: &NewShow) -> Result<()> {
    let mut tx = pool.begin().await?;

    let updated =
        sqlx::query("UPDATE show SET venue_id = ?, artist_id = ?, start_time = ? WHERE id = ?")
            .bind(show.venue_id)
            .bind(show.artist_id)
            .bind(format_start_time(&show.start_time))
            .bind(id)
            .execute(&mut *tx)
            .await;

    let result = match updated {
        Ok(result) => result,
        Err(e) => {
            let err = Error::from(e);
            if let Error::ReferentialIntegrity(_) = err {
                warn!(show_id = id, "Rejected show update with dangling reference");
            }
            return Err(err);
        }
    };

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("show {}", id)));
    }

    tx.commit().await?;

    info!(show_id = id, "Updated show");
    Ok(())
}

/// Load show by id
pub async fn get_show(pool: &SqlitePool, id: EntityId) -> Result<Option<ShowRecord>> {
    let row = sqlx::query(&format!("{} WHERE s.id = ?", SHOW_SELECT))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(show_from_row).transpose()
}

/// All shows ordered by id
pub async fn list_shows(pool: &SqlitePool) -> Result<Vec<ShowRecord>> {
    let rows = sqlx::query(&format!("{} ORDER BY s.id", SHOW_SELECT))
        .fetch_all(pool)
        .await?;

    rows.iter().map(show_from_row).collect()
}

/// Shows held at one venue
pub async fn shows_for_venue(pool: &SqlitePool, venue_id: EntityId) -> Result<Vec<ShowRecord>> {
    let rows = sqlx::query(&format!("{} WHERE s.venue_id = ? ORDER BY s.id", SHOW_SELECT))
        .bind(venue_id)
        .fetch_all(pool)
        .await?;

    rows.iter().map(show_from_row).collect()
}

/// Shows played by one artist
pub async fn shows_for_artist(pool: &SqlitePool, artist_id: EntityId) -> Result<Vec<ShowRecord>> {
    let rows = sqlx::query(&format!("{} WHERE s.artist_id = ? ORDER BY s.id", SHOW_SELECT))
        .bind(artist_id)
        .fetch_all(pool)
        .await?;

    rows.iter().map(show_from_row).collect()
}

/// Delete a single show
pub async fn delete_show(pool: &SqlitePool, id: EntityId) -> Result<()> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query("DELETE FROM show WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("show {}", id)));
    }

    tx.commit().await?;

    info!(show_id = id, "Deleted show");
    Ok(())
}

fn show_from_row(row: &SqliteRow) -> Result<ShowRecord> {
    Ok(ShowRecord {
        id: row.try_get("id")?,
        venue_id: row.try_get("venue_id")?,
        venue_name: row.try_get("venue_name")?,
        venue_image_link: row.try_get("venue_image_link")?,
        artist_id: row.try_get("artist_id")?,
        artist_name: row.try_get("artist_name")?,
        artist_image_link: row.try_get("artist_image_link")?,
        start_time: row.try_get("start_time")?,
    })
}
