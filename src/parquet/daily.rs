//! Save an assembled dataset to a parquet file.
//!
//! The layout is long-format over (date, station): one row per cell of the
//! time × station grid, one nullable column per variable plus its quality
//! flag. CF-style attributes ride on the Arrow schema and survive the
//! round trip through the file.

use std::{collections::HashMap, fs, fs::File, path::Path, sync::Arc};

use arrow::{
    array::{ArrayRef, Date32Builder, Float32Builder, Float64Builder, StringBuilder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use chrono::{Datelike, NaiveDate};
use parquet::{arrow::ArrowWriter, file::properties::WriterProperties};

use crate::{cli::create_progress_bar, dataset::DailyDataset, errors::WriteError};

use super::metadata;

const CHUNK_SIZE: usize = 100_000;

pub fn save_daily(dataset: &DailyDataset, file_path: &Path) -> Result<(), WriteError> {
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(file_path)?;

    let schema = Arc::new(build_schema(dataset));
    let props = WriterProperties::builder()
        .set_compression(parquet::basic::Compression::ZSTD(
            parquet::basic::ZstdLevel::default(),
        ))
        .set_dictionary_enabled(true)
        .build();
    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

    let pb = create_progress_bar(dataset.num_rows() as u64, "Writing parquet file".to_string());
    let epoch_offset = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().num_days_from_ce();

    let num_stations = dataset.stations.len();
    let mut builders = RowBuilders::new(dataset.elements.len());
    let mut rows_in_batch = 0;
    let mut rows_written = 0u64;

    for (time_idx, date) in dataset.time.iter().enumerate() {
        let date32 = date.num_days_from_ce() - epoch_offset;

        for (station_idx, station) in dataset.stations.iter().enumerate() {
            let cell = time_idx * num_stations + station_idx;

            builders.date.append_value(date32);
            builders.station.append_value(&station.id);
            builders.latitude.append_value(station.latitude);
            builders.longitude.append_value(station.longitude);
            builders.elevation.append_option(station.elevation);
            for (element_idx, element) in dataset.elements.iter().enumerate() {
                builders.values[element_idx].append_option(dataset.values(element)[cell]);
                builders.qflags[element_idx]
                    .append_option(dataset.quality_flags(element)[cell].as_deref());
            }

            rows_in_batch += 1;
            rows_written += 1;
            if rows_written % 10_000 == 0 {
                pb.set_position(rows_written);
            }
            if rows_in_batch >= CHUNK_SIZE {
                writer.write(&builders.finish(&schema)?)?;
                rows_in_batch = 0;
            }
        }
    }

    if rows_in_batch > 0 {
        writer.write(&builders.finish(&schema)?)?;
    }

    pb.finish_with_message("Finished writing parquet file");
    writer.close()?;

    Ok(())
}

fn build_schema(dataset: &DailyDataset) -> Schema {
    let mut fields = vec![
        Field::new("date", DataType::Date32, false).with_metadata(string_map(&[
            ("standard_name", "time"),
            ("long_name", "observation date"),
        ])),
        Field::new("station", DataType::Utf8, false).with_metadata(string_map(&[
            ("cf_role", "timeseries_id"),
            ("long_name", "GHCND station identifier"),
        ])),
        Field::new("latitude", DataType::Float64, false).with_metadata(string_map(&[
            ("units", "degrees_north"),
            ("standard_name", "latitude"),
        ])),
        Field::new("longitude", DataType::Float64, false).with_metadata(string_map(&[
            ("units", "degrees_east"),
            ("standard_name", "longitude"),
        ])),
        Field::new("elevation", DataType::Float64, true).with_metadata(string_map(&[
            ("units", "m"),
            ("standard_name", "surface_altitude"),
        ])),
    ];
    for element in &dataset.elements {
        fields.push(
            Field::new(element.column_name(), DataType::Float32, true)
                .with_metadata(metadata::variable_attrs(element)),
        );
        fields.push(
            Field::new(format!("{}_qflag", element.column_name()), DataType::Utf8, true)
                .with_metadata(HashMap::from([(
                    "long_name".to_string(),
                    format!("{} quality flag", element.code()),
                )])),
        );
    }

    Schema::new(fields).with_metadata(metadata::global_attrs(dataset))
}

fn string_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// One builder per column, reused across batches; finish() drains them.
struct RowBuilders {
    date: Date32Builder,
    station: StringBuilder,
    latitude: Float64Builder,
    longitude: Float64Builder,
    elevation: Float64Builder,
    values: Vec<Float32Builder>,
    qflags: Vec<StringBuilder>,
}

impl RowBuilders {
    fn new(num_elements: usize) -> Self {
        RowBuilders {
            date: Date32Builder::with_capacity(CHUNK_SIZE),
            station: StringBuilder::with_capacity(CHUNK_SIZE, CHUNK_SIZE * 12),
            latitude: Float64Builder::with_capacity(CHUNK_SIZE),
            longitude: Float64Builder::with_capacity(CHUNK_SIZE),
            elevation: Float64Builder::with_capacity(CHUNK_SIZE),
            values: (0..num_elements)
                .map(|_| Float32Builder::with_capacity(CHUNK_SIZE))
                .collect(),
            qflags: (0..num_elements)
                .map(|_| StringBuilder::with_capacity(CHUNK_SIZE, CHUNK_SIZE))
                .collect(),
        }
    }

    fn finish(&mut self, schema: &Arc<Schema>) -> Result<RecordBatch, WriteError> {
        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(self.date.finish()),
            Arc::new(self.station.finish()),
            Arc::new(self.latitude.finish()),
            Arc::new(self.longitude.finish()),
            Arc::new(self.elevation.finish()),
        ];
        for (value, qflag) in self.values.iter_mut().zip(self.qflags.iter_mut()) {
            columns.push(Arc::new(value.finish()));
            columns.push(Arc::new(qflag.finish()));
        }

        Ok(RecordBatch::try_new(schema.clone(), columns)?)
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use arrow::array::{Array, Float32Array, StringArray};
    use chrono::NaiveDate;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::TempDir;

    use crate::dataset::StationSeries;
    use crate::reading::{Element, ObservationRecord, StationMetadata};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dataset_fixture() -> DailyDataset {
        let start = date(2020, 1, 1);
        let end = date(2020, 1, 3);
        let metadata = StationMetadata {
            id: "USC00351877".to_string(),
            name: Some("PORTLAND 2, OR US".to_string()),
            latitude: 45.5219,
            longitude: -122.6868,
            elevation: Some(48.8),
        };
        let records = vec![
            ObservationRecord {
                station: "USC00351877".to_string(),
                date: start,
                element: Element::Tmax,
                value: 8.9,
                quality: None,
            },
            ObservationRecord {
                station: "USC00351877".to_string(),
                date: date(2020, 1, 2),
                element: Element::Prcp,
                value: 12.4,
                quality: Some("G".to_string()),
            },
        ];

        DailyDataset::assemble(
            vec![StationSeries {
                metadata,
                start,
                end,
                records,
            }],
            false,
        )
        .unwrap()
    }

    #[test]
    fn should_write_long_format_schema() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("daily.parquet");
        let dataset = dataset_fixture();

        save_daily(&dataset, &path)?;

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path)?)?;
        let schema = reader.schema().clone();

        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(
            names,
            vec![
                "date", "station", "latitude", "longitude", "elevation", "prcp", "prcp_qflag",
                "snow", "snow_qflag", "snwd", "snwd_qflag", "tmax", "tmax_qflag", "tmin",
                "tmin_qflag",
            ]
        );

        // exactly the five core variables as Float32 columns
        let variables = schema
            .fields()
            .iter()
            .filter(|f| *f.data_type() == DataType::Float32)
            .count();
        assert_eq!(variables, 5);

        Ok(())
    }

    #[test]
    fn should_round_trip_station_metadata_attributes() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("daily.parquet");
        let dataset = dataset_fixture();
        let expected = dataset.stations[0].clone();

        save_daily(&dataset, &path)?;

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path)?)?;
        let attrs = reader.schema().metadata().clone();

        assert_eq!(attrs.get("dataset").unwrap(), "daily-summaries");
        assert_eq!(attrs.get("stations").unwrap(), "USC00351877");
        assert_eq!(attrs.get("start_date").unwrap(), "2020-01-01");
        assert_eq!(attrs.get("end_date").unwrap(), "2020-01-03");
        assert_eq!(attrs.get("Conventions").unwrap(), "CF-1.8");
        assert!(attrs.contains_key("accessed"));

        let recovered = StationMetadata::from_attrs("USC00351877", &attrs).unwrap();
        assert_eq!(recovered, expected);

        Ok(())
    }

    #[test]
    fn should_preserve_variable_attributes() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("daily.parquet");

        save_daily(&dataset_fixture(), &path)?;

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path)?)?;
        let schema = reader.schema().clone();
        let prcp = schema.field_with_name("prcp")?;

        assert_eq!(prcp.metadata().get("units").unwrap(), "mm");
        assert_eq!(
            prcp.metadata().get("standard_name").unwrap(),
            "lwe_thickness_of_precipitation_amount"
        );

        Ok(())
    }

    #[test]
    fn should_mark_missing_cells_null() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("daily.parquet");

        save_daily(&dataset_fixture(), &path)?;

        let reader =
            ParquetRecordBatchReaderBuilder::try_new(File::open(&path)?)?.build()?;

        let mut rows = 0;
        let mut tmax_values = Vec::new();
        let mut prcp_nulls = 0;
        let mut qflags = Vec::new();
        for batch in reader {
            let batch = batch?;
            rows += batch.num_rows();

            let tmax = batch
                .column_by_name("tmax")
                .and_then(|c| c.as_any().downcast_ref::<Float32Array>().cloned())
                .unwrap();
            for i in 0..tmax.len() {
                tmax_values.push(tmax.is_valid(i).then(|| tmax.value(i)));
            }

            prcp_nulls += batch.column_by_name("prcp").unwrap().null_count();

            let prcp_qflag = batch
                .column_by_name("prcp_qflag")
                .and_then(|c| c.as_any().downcast_ref::<StringArray>().cloned())
                .unwrap();
            for i in 0..prcp_qflag.len() {
                qflags.push(prcp_qflag.is_valid(i).then(|| prcp_qflag.value(i).to_string()));
            }
        }

        // 3 days x 1 station; TMAX observed on day 1 only, PRCP on day 2 only
        assert_eq!(rows, 3);
        assert_eq!(tmax_values, vec![Some(8.9), None, None]);
        assert_eq!(prcp_nulls, 2);
        assert_eq!(qflags, vec![None, Some("G".to_string()), None]);

        Ok(())
    }

    #[test]
    fn should_create_missing_output_directory() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nested").join("daily.parquet");

        save_daily(&dataset_fixture(), &path)?;

        assert!(path.exists());

        Ok(())
    }
}
