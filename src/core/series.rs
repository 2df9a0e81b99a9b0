use super::error::SeriesError;
use super::types::MonthlyRecord;

/// Calendar-ordered monthly records with no gaps.
///
/// Contiguity is checked on construction, so a `(year, month)` lookup is a
/// plain offset from the first record.
#[derive(Debug, Clone, Default)]
pub struct DataSeries {
    records: Vec<MonthlyRecord>,
}

fn month_index(year: u32, month: u32) -> u64 {
    year as u64 * 12 + (month as u64 - 1)
}

impl DataSeries {
    pub fn new(records: Vec<MonthlyRecord>) -> Result<Self, SeriesError> {
        for record in &records {
            if !(1..=12).contains(&record.month) {
                return Err(SeriesError::InvalidMonth {
                    year: record.year,
                    month: record.month,
                });
            }
        }

        for pair in records.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if month_index(next.year, next.month) != month_index(prev.year, prev.month) + 1 {
                return Err(SeriesError::Gap {
                    prev_year: prev.year,
                    prev_month: prev.month,
                    year: next.year,
                    month: next.month,
                });
            }
        }

        Ok(Self { records })
    }

    /// Builds a series starting at `(year, month)` from consecutive values.
    pub fn from_values(year: u32, month: u32, values: &[f64]) -> Result<Self, SeriesError> {
        if !(1..=12).contains(&month) {
            return Err(SeriesError::InvalidMonth { year, month });
        }
        let start = month_index(year, month);
        let records = values
            .iter()
            .enumerate()
            .map(|(offset, &value)| {
                let index = start + offset as u64;
                MonthlyRecord {
                    year: (index / 12) as u32,
                    month: (index % 12) as u32 + 1,
                    value,
                }
            })
            .collect();
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&MonthlyRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&MonthlyRecord> {
        self.records.last()
    }

    pub fn records(&self) -> &[MonthlyRecord] {
        &self.records
    }

    pub fn position(&self, year: u32, month: u32) -> Result<usize, SeriesError> {
        let missing = SeriesError::MissingMonth { year, month };
        if !(1..=12).contains(&month) {
            return Err(missing);
        }
        let first = self.records.first().ok_or(missing.clone())?;
        let target = month_index(year, month);
        let origin = month_index(first.year, first.month);
        if target < origin {
            return Err(missing);
        }
        let index = (target - origin) as usize;
        if index >= self.records.len() {
            return Err(missing);
        }
        Ok(index)
    }

    pub fn cursor(&self, year: u32, month: u32) -> Result<SeriesCursor<'_>, SeriesError> {
        let position = self.position(year, month)?;
        Ok(SeriesCursor {
            records: &self.records,
            position,
        })
    }
}

/// Forward-only reader over a `DataSeries`. Reading past the end is an error.
#[derive(Debug, Clone)]
pub struct SeriesCursor<'a> {
    records: &'a [MonthlyRecord],
    position: usize,
}

impl SeriesCursor<'_> {
    pub fn current(&self) -> Result<&MonthlyRecord, SeriesError> {
        self.records.get(self.position).ok_or(SeriesError::Exhausted {
            len: self.records.len(),
        })
    }

    pub fn advance(&mut self) {
        self.position += 1;
    }

    pub fn has_more(&self) -> bool {
        self.position < self.records.len()
    }

    /// Value under the cursor, then step to the next month.
    pub fn next_value(&mut self) -> Result<f64, SeriesError> {
        let value = self.current()?.value;
        self.advance();
        Ok(value)
    }
}
