//! Artist database operations

use crate::db::name_contains;
use crate::models::{Artist, ArtistFields, EntityId};
use crate::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

const ARTIST_COLUMNS: &str = "id, name, city, state, genres, phone, image_link, \
                              facebook_link, website, seeking_venue, seeking_description";

/// Insert an artist, returning its new id
pub async fn create_artist(pool: &SqlitePool, fields: &ArtistFields) -> Result<EntityId> {
    let mut tx = pool.begin().await?;

    let id = sqlx::query(
        r#"
        INSERT INTO artist (
            name, city, state, genres, phone, image_link,
            facebook_link, website, seeking_venue, seeking_description
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&fields.name)
    .bind(&fields.city)
    .bind(&fields.state)
    .bind(Json(&fields.genres))
    .bind(&fields.phone)
    .bind(&fields.image_link)
    .bind(&fields.facebook_link)
    .bind(&fields.website)
    .bind(fields.seeking_venue())
    .bind(&fields.seeking_description)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    tx.commit().await?;

    info!(artist_id = id, "Created artist {:?}", fields.name);
    Ok(id)
}

/// Load artist by id
pub async fn get_artist(pool: &SqlitePool, id: EntityId) -> Result<Option<Artist>> {
    let row = sqlx::query(&format!("SELECT {} FROM artist WHERE id = ?", ARTIST_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(artist_from_row).transpose()
}

/// All artists ordered by id
pub async fn list_artists(pool: &SqlitePool) -> Result<Vec<Artist>> {
    let rows = sqlx::query(&format!("SELECT {} FROM artist ORDER BY id", ARTIST_COLUMNS))
        .fetch_all(pool)
        .await?;

    rows.iter().map(artist_from_row).collect()
}

/// Artists whose name contains `term`, ignoring case, ordered by name
pub async fn search_artists(pool: &SqlitePool, term: &str) -> Result<Vec<Artist>> {
    let rows = sqlx::query(&format!("SELECT {} FROM artist ORDER BY name, id", ARTIST_COLUMNS))
        .fetch_all(pool)
        .await?;

    let mut matched = Vec::new();
    for row in &rows {
        let artist = artist_from_row(row)?;
        if name_contains(&artist.name, term) {
            matched.push(artist);
        }
    }

    debug!("Artist search {:?} matched {} of {} rows", term, matched.len(), rows.len());
    Ok(matched)
}

/// Replace every editable field of an artist
pub async fn update_artist(pool: &SqlitePool, id: EntityId, fields: &ArtistFields) -> Result<()> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE artist SET
            name = ?, city = ?, state = ?, genres = ?, phone = ?,
            image_link = ?, facebook_link = ?, website = ?,
            seeking_venue = ?, seeking_description = ?
        WHERE id = ?
        "#,
    )
    .bind(&fields.name)
    .bind(&fields.city)
    .bind(&fields.state)
    .bind(Json(&fields.genres))
    .bind(&fields.phone)
    .bind(&fields.image_link)
    .bind(&fields.facebook_link)
    .bind(&fields.website)
    .bind(fields.seeking_venue())
    .bind(&fields.seeking_description)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("artist {}", id)));
    }

    tx.commit().await?;

    info!(artist_id = id, "Updated artist {:?}", fields.name);
    Ok(())
}

/// Delete an artist and its shows, returning how many shows went with it
pub async fn delete_artist(pool: &SqlitePool, id: EntityId) -> Result<u64> {
    let mut tx = pool.begin().await?;

    let shows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM show WHERE artist_id = ?")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM artist WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("artist {}", id)));
    }

    tx.commit().await?;

    info!(artist_id = id, "Deleted artist and {} show(s)", shows);
    Ok(shows as u64)
}

fn artist_from_row(row: &SqliteRow) -> Result<Artist> {
    let Json(genres): Json<Vec<String>> = row.try_get("genres")?;

    Ok(Artist {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        genres,
        phone: row.try_get("phone")?,
        image_link: row.try_get("image_link")?,
        facebook_link: row.try_get("facebook_link")?,
        website: row.try_get("website")?,
        seeking_venue: row.try_get("seeking_venue")?,
        seeking_description: row.try_get("seeking_description")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    fn fields(name: &str) -> ArtistFields {
        ArtistFields {
            name: name.to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            genres: vec!["Rock n Roll".to_string()],
            phone: "326-123-5000".to_string(),
            image_link: "https://images.example.com/a.jpg".to_string(),
            facebook_link: Some("https://www.facebook.com/GunsNPetals".to_string()),
            website: None,
            seeking_description: Some("Looking for shows in the Bay Area".to_string()),
        }
    }

    #[tokio::test]
    async fn test_save_and_load_artist() {
        let pool = connect_in_memory().await.unwrap();
        let id = create_artist(&pool, &fields("Guns N Petals")).await.unwrap();

        let artist = get_artist(&pool, id).await.unwrap().expect("artist exists");
        assert_eq!(artist.name, "Guns N Petals");
        assert_eq!(artist.genres, vec!["Rock n Roll"]);
        assert!(artist.seeking_venue);
    }

    #[tokio::test]
    async fn test_blank_description_clears_seeking() {
        let pool = connect_in_memory().await.unwrap();
        let id = create_artist(&pool, &fields("Matt Quevedo")).await.unwrap();

        let mut f = fields("Matt Quevedo");
        f.seeking_description = None;
        update_artist(&pool, id, &f).await.unwrap();
        assert!(!get_artist(&pool, id).await.unwrap().unwrap().seeking_venue);
    }

    #[tokio::test]
    async fn test_search_artists_folds_non_ascii_case() {
        let pool = connect_in_memory().await.unwrap();
        create_artist(&pool, &fields("Björk")).await.unwrap();
        create_artist(&pool, &fields("SIGUR RÓS")).await.unwrap();

        let names: Vec<String> = search_artists(&pool, "ró")
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["SIGUR RÓS"]);
        assert_eq!(search_artists(&pool, "BJÖ").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_artists() {
        let pool = connect_in_memory().await.unwrap();
        create_artist(&pool, &fields("Guns N Petals")).await.unwrap();
        create_artist(&pool, &fields("Matt Quevedo")).await.unwrap();
        create_artist(&pool, &fields("The Wild Sax Band")).await.unwrap();

        let names: Vec<String> = search_artists(&pool, "A")
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["Guns N Petals", "Matt Quevedo", "The Wild Sax Band"]);

        let names: Vec<String> = search_artists(&pool, "band")
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["The Wild Sax Band"]);
    }

    #[tokio::test]
    async fn test_delete_unknown_artist() {
        let pool = connect_in_memory().await.unwrap();
        assert!(matches!(delete_artist(&pool, 3).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_artists() {
        let pool = connect_in_memory().await.unwrap();
        assert!(list_artists(&pool).await.unwrap().is_empty());
        create_artist(&pool, &fields("Guns N Petals")).await.unwrap();
        assert_eq!(list_artists(&pool).await.unwrap().len(), 1);
    }
}
