//! Region / prefecture catalog loading.

use sqlx::SqlitePool;

use crate::db::models::{Prefecture, Region};
use crate::db::queries;
use crate::errors::AppError;
use crate::services::jma::{decode_area_catalog, JmaClient};

/// Fetch `area.json` and upsert every center as a region and every office
/// as a prefecture. Safe to run on every start.
///
/// An office whose parent is not among the centers is still stored, with no
/// region, so it stays reachable by name.
///
/// Returns (regions, prefectures) written. On error nothing is written and
/// rows from earlier runs remain usable.
pub async fn load_catalog(
    pool: &SqlitePool,
    client: &JmaClient,
) -> Result<(usize, usize), AppError> {
    let raw = client.fetch_area_catalog().await?;
    let catalog = decode_area_catalog(&raw)?;

    let regions: Vec<Region> = catalog
        .centers
        .into_iter()
        .map(|(code, center)| Region {
            region_code: code,
            region_name: center.name,
        })
        .collect();

    let prefectures: Vec<Prefecture> = catalog
        .offices
        .into_iter()
        .map(|(code, office)| {
            let known_parent = regions.iter().any(|r| r.region_code == office.parent);
            if !known_parent {
                tracing::warn!(
                    "Office {} ({}) references unknown center {}, storing without a region",
                    code,
                    office.name,
                    office.parent
                );
            }
            Prefecture {
                prefecture_code: code,
                prefecture_name: office.name,
                region_code: known_parent.then_some(office.parent),
            }
        })
        .collect();

    queries::upsert_catalog(pool, &regions, &prefectures).await?;

    Ok((regions.len(), prefectures.len()))
}
