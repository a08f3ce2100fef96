use std::marker::PhantomData;

use crate::dao::PoolType;

#[derive(Debug)]
pub struct Table<T> {
    pub pool: PoolType,
    _type: PhantomData<T>,
}

impl<T> Table<T> {
    pub fn new(pool: PoolType) -> Table<T> {
        Table {
            pool,
            _type: PhantomData,
        }
    }
}
