use polars::prelude::{DataFrame, NamedFrom, PolarsResult, Series};

use crate::model::{Column, ColumnData, Table};

impl Column {
    pub fn to_series(&self) -> Series {
        let name = self.name().into();
        match self.data() {
            ColumnData::Integer(values) => Series::new(name, values.clone()),
            ColumnData::Float(values) => Series::new(name, values.clone()),
            ColumnData::Text(values) => {
                let utf8: Vec<Option<&str>> = values.iter().map(|v| v.as_deref()).collect();
                Series::new(name, utf8)
            }
        }
    }
}

impl Table {
    /// Index first, then every data column in order.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        frame_from_columns(std::iter::once(self.index()).chain(self.columns()))
    }
}

pub fn frame_from_columns<'a, I>(columns: I) -> PolarsResult<DataFrame>
where
    I: IntoIterator<Item = &'a Column>,
{
    let cols: Vec<polars::prelude::Column> = columns
        .into_iter()
        .map(|column| column.to_series().into())
        .collect();
    DataFrame::new(cols)
}
