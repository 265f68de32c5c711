//! Venue database operations

use crate::db::name_contains;
use crate::models::{EntityId, Venue, VenueFields};
use crate::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

const VENUE_COLUMNS: &str = "id, name, city, state, address, genres, phone, image_link, \
                             facebook_link, website, seeking_talent, seeking_description";

/// Insert a venue, returning its new id
pub async fn create_venue(pool: &SqlitePool, fields: &VenueFields) -> Result<EntityId> {
    let mut tx = pool.begin().await?;

    let id = sqlx::query(
        r#"
        INSERT INTO venue (
            name, city, state, address, genres, phone, image_link,
            facebook_link, website, seeking_talent, seeking_description
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&fields.name)
    .bind(&fields.city)
    .bind(&fields.state)
    .bind(&fields.address)
    .bind(Json(&fields.genres))
    .bind(&fields.phone)
    .bind(&fields.image_link)
    .bind(&fields.facebook_link)
    .bind(&fields.website)
    .bind(fields.seeking_talent())
    .bind(&fields.seeking_description)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    tx.commit().await?;

    info!(venue_id = id, "Created venue {:?}", fields.name);
    Ok(id)
}

/// Load venue by id
pub async fn get_venue(pool: &SqlitePool, id: EntityId) -> Result<Option<Venue>> {
    let row = sqlx::query(&format!("SELECT {} FROM venue WHERE id = ?", VENUE_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(venue_from_row).transpose()
}

/// All venues ordered by id
pub async fn list_venues(pool: &SqlitePool) -> Result<Vec<Venue>> {
    let rows = sqlx::query(&format!("SELECT {} FROM venue ORDER BY id", VENUE_COLUMNS))
        .fetch_all(pool)
        .await?;

    rows.iter().map(venue_from_row).collect()
}

/// Venues whose name contains `term`, ignoring case, ordered by name
pub async fn search_venues(pool: &SqlitePool, term: &str) -> Result<Vec<Venue>> {
    let rows = sqlx::query(&format!("SELECT {} FROM venue ORDER BY name, id", VENUE_COLUMNS))
        .fetch_all(pool)
        .await?;

    let mut matched = Vec::new();
    for row in &rows {
        let venue = venue_from_row(row)?;
        if name_contains(&venue.name, term) {
            matched.push(venue);
        }
    }

    debug!("Venue search {:?} matched {} of {} rows", term, matched.len(), rows.len());
    Ok(matched)
}

/// Replace every editable field of a venue
pub async fn update_venue(pool: &SqlitePool, id: EntityId, fields: &VenueFields) -> Result<()> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE venue SET
            name = ?, city = ?, state = ?, address = ?, genres = ?, phone = ?,
            image_link = ?, facebook_link = ?, website = ?,
            seeking_talent = ?, seeking_description = ?
        WHERE id = ?
        "#,
    )
    .bind(&fields.name)
    .bind(&fields.city)
    .bind(&fields.state)
    .bind(&fields.address)
    .bind(Json(&fields.genres))
    .bind(&fields.phone)
    .bind(&fields.image_link)
    .bind(&fields.facebook_link)
    .bind(&fields.website)
    .bind(fields.seeking_talent())
    .bind(&fields.seeking_description)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("venue {}", id)));
    }

    tx.commit().await?;

    info!(venue_id = id, "Updated venue {:?}", fields.name);
    Ok(())
}

/// Delete a venue and, through the foreign key cascade, its shows
///
/// Returns the number of shows removed with it.
pub async fn delete_venue(pool: &SqlitePool, id: EntityId) -> Result<u64> {
    let mut tx = pool.begin().await?;

    let shows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM show WHERE venue_id = ?")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM venue WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("venue {}", id)));
    }

    tx.commit().await?;

    info!(venue_id = id, "Deleted venue and {} show(s)", shows);
    Ok(shows as u64)
}

fn venue_from_row(row: &SqliteRow) -> Result<Venue> {
    let Json(genres): Json<Vec<String>> = row.try_get("genres")?;

    Ok(Venue {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        address: row.try_get("address")?,
        genres,
        phone: row.try_get("phone")?,
        image_link: row.try_get("image_link")?,
        facebook_link: row.try_get("facebook_link")?,
        website: row.try_get("website")?,
        seeking_talent: row.try_get("seeking_talent")?,
        seeking_description: row.try_get("seeking_description")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    fn fields(name: &str, city: &str, state: &str) -> VenueFields {
        VenueFields {
            name: name.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            address: "1015 Folsom Street".to_string(),
            genres: vec!["Jazz".to_string(), "Folk".to_string()],
            phone: "123-123-1234".to_string(),
            image_link: "https://images.example.com/v.jpg".to_string(),
            facebook_link: None,
            website: Some("https://www.themusicalhop.com".to_string()),
            seeking_description: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_venue() {
        let pool = connect_in_memory().await.unwrap();
        let id = create_venue(&pool, &fields("The Musical Hop", "San Francisco", "CA"))
            .await
            .unwrap();

        let venue = get_venue(&pool, id).await.unwrap().expect("venue exists");
        assert_eq!(venue.name, "The Musical Hop");
        assert_eq!(venue.genres, vec!["Jazz", "Folk"]);
        assert_eq!(venue.website.as_deref(), Some("https://www.themusicalhop.com"));
        assert!(!venue.seeking_talent);
    }

    #[tokio::test]
    async fn test_get_unknown_venue() {
        let pool = connect_in_memory().await.unwrap();
        assert!(get_venue(&pool, 42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_seeking_flag_written_from_description() {
        let pool = connect_in_memory().await.unwrap();
        let mut f = fields("Park Square", "New York", "NY");
        f.seeking_description = Some("Open mic performers".to_string());
        let id = create_venue(&pool, &f).await.unwrap();
        assert!(get_venue(&pool, id).await.unwrap().unwrap().seeking_talent);

        f.seeking_description = None;
        update_venue(&pool, id, &f).await.unwrap();
        let venue = get_venue(&pool, id).await.unwrap().unwrap();
        assert!(!venue.seeking_talent);
        assert!(venue.seeking_description.is_none());
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let pool = connect_in_memory().await.unwrap();
        let id = create_venue(&pool, &fields("Old Name", "Austin", "TX")).await.unwrap();

        let mut f = fields("New Name", "Dallas", "TX");
        f.genres = vec!["Blues".to_string()];
        f.website = None;
        update_venue(&pool, id, &f).await.unwrap();

        let venue = get_venue(&pool, id).await.unwrap().unwrap();
        assert_eq!(venue.name, "New Name");
        assert_eq!(venue.city, "Dallas");
        assert_eq!(venue.genres, vec!["Blues"]);
        assert!(venue.website.is_none());
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_venue() {
        let pool = connect_in_memory().await.unwrap();
        let err = update_venue(&pool, 7, &fields("X", "Y", "CA")).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let err = delete_venue(&pool, 7).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_substring() {
        let pool = connect_in_memory().await.unwrap();
        create_venue(&pool, &fields("The Musical Hop", "San Francisco", "CA")).await.unwrap();
        create_venue(&pool, &fields("Park Square Live Music & Coffee", "New York", "NY")).await.unwrap();
        create_venue(&pool, &fields("The Dueling Pianos Bar", "New York", "NY")).await.unwrap();

        let names: Vec<String> = search_venues(&pool, "Hop")
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(names, vec!["The Musical Hop"]);

        assert_eq!(search_venues(&pool, "music").await.unwrap().len(), 2);
        assert_eq!(search_venues(&pool, "").await.unwrap().len(), 3);
        assert!(search_venues(&pool, "%").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case() {
        let pool = connect_in_memory().await.unwrap();
        let id = create_venue(&pool, &fields("CAFÉ ÜBER", "Austin", "TX")).await.unwrap();
        create_venue(&pool, &fields("Cafe Uber", "Austin", "TX")).await.unwrap();

        let hits = search_venues(&pool, "café").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, id);
        assert_eq!(search_venues(&pool, "über").await.unwrap()[0].id, id);
    }

    #[tokio::test]
    async fn test_list_venues_in_id_order() {
        let pool = connect_in_memory().await.unwrap();
        let a = create_venue(&pool, &fields("B", "X", "CA")).await.unwrap();
        let b = create_venue(&pool, &fields("A", "X", "CA")).await.unwrap();
        let ids: Vec<EntityId> = list_venues(&pool).await.unwrap().iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![a, b]);
    }
}
