use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};

use crate::actor_framework::Repository;
use crate::db::{self, DatabaseLocation, StoreError};
use crate::domain::{Category, Product, ProductFilter};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS products (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL,
    category    TEXT    NOT NULL,
    description TEXT,
    price       REAL    NOT NULL,
    image_url   TEXT,
    stock       INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT    NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_products_category ON products (category);
";

const COLUMNS: &str = "id, name, category, description, price, image_url, stock, created_at";

/// The `products` table.
pub struct ProductRepository {
    conn: Connection,
}

impl ProductRepository {
    pub fn open(location: &DatabaseLocation) -> Result<Self, StoreError> {
        let conn = db::open(location)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    let category: String = row.get(2)?;
    let category = category
        .parse::<Category>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        category,
        description: row.get(3)?,
        price: row.get(4)?,
        image_url: row.get(5)?,
        stock: row.get(6)?,
        created_at: row.get(7)?,
    })
}

impl Repository<Product> for ProductRepository {
    fn next_id(&mut self) -> Result<i64, StoreError> {
        db::next_rowid(&self.conn, "products")
    }

    fn insert(&mut self, item: &Product) -> Result<(), StoreError> {
        self.conn.execute(
            &format!("INSERT INTO products ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
            params![
                item.id,
                item.name,
                item.category.as_str(),
                item.description,
                item.price,
                item.image_url,
                item.stock,
                item.created_at,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &i64) -> Result<Option<Product>, StoreError> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("SELECT {COLUMNS} FROM products WHERE id = ?1"))?;
        let mut rows = stmt.query_map([id], product_from_row)?;
        let product = rows.next().transpose()?;
        Ok(product)
    }

    fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {COLUMNS} FROM products WHERE ?1 IS NULL OR category = ?1 ORDER BY id"
        ))?;
        let rows = stmt.query_map([filter.category.map(|c| c.as_str())], product_from_row)?;
        let products = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(products)
    }

    fn count(&self, filter: &ProductFilter) -> Result<u64, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM products WHERE ?1 IS NULL OR category = ?1",
            [filter.category.map(|c| c.as_str())],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    fn save(&mut self, item: &Product) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE products
             SET name = ?2, category = ?3, description = ?4, price = ?5, image_url = ?6, stock = ?7
             WHERE id = ?1",
            params![
                item.id,
                item.name,
                item.category.as_str(),
                item.description,
                item.price,
                item.image_url,
                item.stock,
            ],
        )?;
        Ok(())
    }

    fn delete(&mut self, id: &i64) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM products WHERE id = ?1", [id])?;
        Ok(())
    }
}
