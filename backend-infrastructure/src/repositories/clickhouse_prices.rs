use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use clickhouse::{Client, Row};
use serde::Deserialize;

use backend_domain::ports::PriceRepository;
use backend_domain::{millis_to_utc, utc_to_millis, PriceQuote, PriceSample, PriceSampleRow};

/// Row shape for `latest_quotes`; clickhouse 0.11 has no `Row` impl for
/// tuples containing `Option`, so the three columns are decoded via a struct.
#[derive(Row, Deserialize)]
struct LatestQuoteRow {
    hash_name: String,
    price: f64,
    median_price: Option<f64>,
}

#[derive(Clone)]
pub struct ClickhousePriceRepository {
    client: Client,
    database: String,
}

impl ClickhousePriceRepository {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }
}

#[async_trait]
impl PriceRepository for ClickhousePriceRepository {
    async fn ensure_schema(&self) -> Result<()> {
        let create_db = format!("CREATE DATABASE IF NOT EXISTS {}", self.database);
        self.client.query(&create_db).execute().await?;

        let create_prices = r#"
CREATE TABLE IF NOT EXISTS price_history (
    sampled_at DateTime64(3),
    hash_name String,
    price Float64,
    median_price Nullable(Float64)
) ENGINE = MergeTree
PARTITION BY toYYYYMM(sampled_at)
ORDER BY (hash_name, sampled_at)
"#;

        self.client.query(create_prices).execute().await?;
        Ok(())
    }

    async fn latest_quotes(&self, hash_names: &[String]) -> Result<HashMap<String, PriceQuote>> {
        if hash_names.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = self
            .client
            .query(
                "SELECT hash_name, argMax(price, sampled_at), argMax(median_price, sampled_at) \
                 FROM price_history WHERE hash_name IN ? GROUP BY hash_name",
            )
            .bind(hash_names)
            .fetch_all::<LatestQuoteRow>()
            .await?;
        Ok(rows
            .into_iter()
            .map(
                |LatestQuoteRow {
                     hash_name,
                     price,
                     median_price,
                 }| {
                    (
                        hash_name,
                        PriceQuote {
                            price: Some(price),
                            median_price,
                        },
                    )
                },
            )
            .collect())
    }

    async fn samples_between(
        &self,
        hash_name: &str,
        from_ms: i64,
        to_ms: i64,
    ) -> Result<Vec<PriceSample>> {
        let rows = self
            .client
            .query(
                "SELECT sampled_at, hash_name, price, median_price FROM price_history \
                 WHERE hash_name = ? \
                 AND sampled_at >= fromUnixTimestamp64Milli(?) \
                 AND sampled_at <= fromUnixTimestamp64Milli(?) \
                 ORDER BY sampled_at",
            )
            .bind(hash_name)
            .bind(from_ms)
            .bind(to_ms)
            .fetch_all::<PriceSampleRow>()
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| PriceSample {
                hash_name: row.hash_name,
                price: row.price,
                median_price: row.median_price,
                sampled_at_ms: utc_to_millis(row.sampled_at),
            })
            .collect())
    }

    async fn insert_samples(&self, samples: &[PriceSample]) -> Result<()> {
        let mut insert = self.client.insert("price_history")?;
        for sample in samples {
            insert
                .write(&PriceSampleRow {
                    sampled_at: millis_to_utc(sample.sampled_at_ms),
                    hash_name: sample.hash_name.clone(),
                    price: sample.price,
                    median_price: sample.median_price,
                })
                .await?;
        }
        insert.end().await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let _: u8 = self.client.query("SELECT toUInt8(1)").fetch_one().await?;
        Ok(())
    }
}
