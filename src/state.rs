use crate::{
    db::{DbPool, OrmConn},
    product_client::ProductClient,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub products: ProductClient,
}
