use rusqlite::{params, Connection, Row};

use crate::actor_framework::Repository;
use crate::db::{self, DatabaseLocation, StoreError};
use crate::domain::{Order, OrderFilter};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS orders (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    customer_name    TEXT    NOT NULL,
    customer_phone   TEXT    NOT NULL,
    customer_email   TEXT,
    customer_address TEXT,
    products         TEXT    NOT NULL,
    total_amount     REAL    NOT NULL,
    order_date       TEXT    NOT NULL,
    status           TEXT    NOT NULL DEFAULT 'pending',
    notes            TEXT
);
CREATE INDEX IF NOT EXISTS idx_orders_order_date ON orders (order_date);
";

const COLUMNS: &str = "id, customer_name, customer_phone, customer_email, customer_address, \
                       products, total_amount, order_date, status, notes";

/// The `orders` table.
pub struct OrderRepository {
    conn: Connection,
}

impl OrderRepository {
    pub fn open(location: &DatabaseLocation) -> Result<Self, StoreError> {
        let conn = db::open(location)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

fn order_from_row(row: &Row<'_>) -> rusqlite::Result<Order> {
    Ok(Order {
        id: row.get(0)?,
        customer_name: row.get(1)?,
        customer_phone: row.get(2)?,
        customer_email: row.get(3)?,
        customer_address: row.get(4)?,
        products: row.get(5)?,
        total_amount: row.get(6)?,
        order_date: row.get(7)?,
        status: row.get(8)?,
        notes: row.get(9)?,
    })
}

impl Repository<Order> for OrderRepository {
    fn next_id(&mut self) -> Result<i64, StoreError> {
        db::next_rowid(&self.conn, "orders")
    }

    fn insert(&mut self, item: &Order) -> Result<(), StoreError> {
        self.conn.execute(
            &format!("INSERT INTO orders ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"),
            params![
                item.id,
                item.customer_name,
                item.customer_phone,
                item.customer_email,
                item.customer_address,
                item.products,
                item.total_amount,
                item.order_date,
                item.status,
                item.notes,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &i64) -> Result<Option<Order>, StoreError> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("SELECT {COLUMNS} FROM orders WHERE id = ?1"))?;
        let mut rows = stmt.query_map([id], order_from_row)?;
        let order = rows.next().transpose()?;
        Ok(order)
    }

    /// Newest first. A negative LIMIT means no limit in SQLite.
    fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError> {
        let limit = filter.limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {COLUMNS} FROM orders ORDER BY order_date DESC, id DESC LIMIT ?1"
        ))?;
        let rows = stmt.query_map([limit], order_from_row)?;
        let orders = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(orders)
    }

    fn count(&self, _filter: &OrderFilter) -> Result<u64, StoreError> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// Only the status is ever written back.
    fn save(&mut self, item: &Order) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE orders SET status = ?2 WHERE id = ?1",
            params![item.id, item.status],
        )?;
        Ok(())
    }

    fn delete(&mut self, id: &i64) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM orders WHERE id = ?1", [id])?;
        Ok(())
    }
}
