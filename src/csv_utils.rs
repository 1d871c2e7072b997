// csv_utils.rs
use crate::public_url_utils::{PublicUrlConnect, PublicUrlConnectConfig};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fs::File;

/// Represents a CsvBuilder object. This struct allows you to specify headers, corresponding data,
/// as well as an internal error handler, and to chain manipulations on small in-memory tables.
#[derive(Debug)]
pub struct CsvBuilder {
    headers: Vec<String>,
    data: Vec<Vec<String>>,
    error: Option<Box<dyn Error>>,
}

impl Default for CsvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvBuilder {
    /// Creates a new, empty `CsvBuilder`.
    ///
    /// ```
    /// use caselink::csv_utils::CsvBuilder;
    ///
    /// let builder = CsvBuilder::new();
    ///
    /// // Initially, there are no headers or data
    /// assert!(builder.get_headers().is_none());
    /// assert!(builder.get_data().is_none());
    /// ```
    pub fn new() -> Self {
        CsvBuilder {
            headers: Vec::new(),
            data: Vec::new(),
            error: None,
        }
    }

    /// Reads data from a CSV file at the specified `file_path` and returns a `CsvBuilder`.
    ///
    /// ## Valid CSV file
    ///
    /// ```
    /// use caselink::csv_utils::CsvBuilder;
    /// use csv::Writer;
    ///
    /// let tmp_file = tempfile::Builder::new()
    ///     .prefix("csv_test")
    ///     .suffix(".csv")
    ///     .tempfile()
    ///     .expect("failed to create temporary file");
    ///
    /// let mut writer = Writer::from_path(tmp_file.path()).expect("failed to create CSV writer");
    /// writer.write_record(&["case", "year"]).expect("failed to write header");
    /// writer.write_record(&["Acme Corp v. Example, Inc.", "1994"]).expect("write record");
    /// writer.flush().expect("flush writer");
    ///
    /// let csv_builder = CsvBuilder::from_csv(tmp_file.path().to_str().unwrap());
    ///
    /// assert_eq!(
    ///     csv_builder.get_headers().unwrap(),
    ///     &["case".to_string(), "year".to_string()]
    /// );
    /// assert_eq!(
    ///     csv_builder.get_data().unwrap(),
    ///     &vec![vec!["Acme Corp v. Example, Inc.".to_string(), "1994".to_string()]]
    /// );
    ///
    /// tmp_file.close().expect("failed to close temporary file");
    /// ```
    ///
    /// ## Non-existent file
    ///
    /// If the specified file path doesn't point to an existing file, the `get_headers`
    /// and `get_data` methods will return `None`, and the error slot is set.
    ///
    /// ```
    /// use caselink::csv_utils::CsvBuilder;
    ///
    /// let csv_builder = CsvBuilder::from_csv("nonexistent_file.csv");
    ///
    /// assert!(csv_builder.get_headers().is_none());
    /// assert!(csv_builder.get_data().is_none());
    /// assert!(csv_builder.has_error());
    /// ```
    pub fn from_csv(file_path: &str) -> Self {
        let mut builder = CsvBuilder::new();

        match File::open(file_path) {
            Ok(file) => {
                let mut rdr = csv::Reader::from_reader(file);

                if let Ok(hdrs) = rdr.headers() {
                    builder.headers = hdrs.iter().map(String::from).collect();
                }

                for result in rdr.records() {
                    match result {
                        Ok(record) => builder.data.push(record.iter().map(String::from).collect()),
                        Err(e) => {
                            builder.error = Some(Box::new(e));
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                builder.error = Some(Box::new(e));
            }
        }

        builder
    }

    /// Creates a `CsvBuilder` directly from already tabulated raw data.
    ///
    /// ```
    /// use caselink::csv_utils::CsvBuilder;
    ///
    /// let headers = vec!["case".to_string(), "year".to_string()];
    /// let data = vec![vec!["Acme Corp v. Example, Inc.".to_string(), "1994".to_string()]];
    ///
    /// let builder = CsvBuilder::from_raw_data(headers, data);
    /// assert!(builder.has_data());
    /// ```
    pub fn from_raw_data(headers: Vec<String>, data: Vec<Vec<String>>) -> Self {
        CsvBuilder {
            headers,
            data,
            error: None,
        }
    }

    /// Returns a copy of the builder, leaving the original intact.
    ///
    /// ```
    /// use caselink::csv_utils::CsvBuilder;
    ///
    /// let original = CsvBuilder::from_raw_data(
    ///     vec!["title".to_string()],
    ///     vec![vec!["Acme Corp".to_string()]],
    /// );
    ///
    /// let mut copy = original.from_copy();
    /// copy.rename_columns(vec![("title", "name")]);
    ///
    /// assert_eq!(original.get_headers().unwrap(), &["title".to_string()]);
    /// assert_eq!(copy.get_headers().unwrap(), &["name".to_string()]);
    /// ```
    pub fn from_copy(&self) -> Self {
        CsvBuilder {
            headers: self.headers.clone(),
            data: self.data.clone(),
            error: None,
        }
    }

    /// Instantiates a CsvBuilder object from a publicly viewable raw CSV url.
    ///
    /// ```no_run
    /// use caselink::csv_utils::CsvBuilder;
    /// use tokio::runtime::Runtime;
    ///
    /// let rt = Runtime::new().unwrap();
    /// rt.block_on(async {
    ///     let csv_builder = CsvBuilder::from_publicly_viewable_url(
    ///         "https://raw.githubusercontent.com/rfordatascience/tidytuesday/master/data/2023/2023-08-29/fair_use_cases.csv"
    ///     ).await;
    ///
    ///     assert!(csv_builder.has_data());
    /// });
    /// ```
    pub async fn from_publicly_viewable_url(url: &str) -> Self {
        let mut builder = CsvBuilder::new();

        let public_url_connect_config = PublicUrlConnectConfig {
            url: url.to_string(),
            url_type: "RAW_CSV".to_string(),
        };

        match PublicUrlConnect::get_raw_csv_data(public_url_connect_config).await {
            Ok((headers, rows)) => {
                builder.headers = headers;
                builder.data = rows;
            }
            Err(e) => {
                builder.error = Some(e);
            }
        }

        builder
    }

    /// Sets the headers of the builder, discarding any previously set headers.
    ///
    /// ```
    /// use caselink::csv_utils::CsvBuilder;
    ///
    /// let mut builder = CsvBuilder::new();
    /// builder.set_header(vec!["title", "year", "outcome"]);
    ///
    /// assert_eq!(
    ///     builder.get_headers().unwrap(),
    ///     &["title".to_string(), "year".to_string(), "outcome".to_string()]
    /// );
    /// ```
    pub fn set_header(&mut self, header: Vec<&str>) -> &mut Self {
        self.headers = header.into_iter().map(String::from).collect();
        self
    }

    /// Adds a single data row.
    ///
    /// ```
    /// use caselink::csv_utils::CsvBuilder;
    ///
    /// let mut builder = CsvBuilder::new();
    /// builder
    ///     .set_header(vec!["title", "year"])
    ///     .add_row(vec!["Acme Corp", "1994"]);
    ///
    /// assert_eq!(builder.get_data().unwrap().len(), 1);
    /// ```
    pub fn add_row(&mut self, row: Vec<&str>) -> &mut Self {
        self.data.push(row.into_iter().map(String::from).collect());
        self
    }

    /// Adds multiple data rows at once.
    pub fn add_rows(&mut self, rows: Vec<Vec<&str>>) -> &mut Self {
        for row in rows {
            self.data.push(row.into_iter().map(String::from).collect());
        }
        self
    }

    /// Drops the specified columns, leaving the remaining columns in their original order.
    ///
    /// ```
    /// use caselink::csv_utils::CsvBuilder;
    ///
    /// let mut builder = CsvBuilder::from_raw_data(
    ///     vec!["title".to_string(), "title_std".to_string(), "year".to_string()],
    ///     vec![vec!["Acme, LLC".to_string(), "acme".to_string(), "1994".to_string()]],
    /// );
    ///
    /// builder.drop_columns(vec!["title_std"]);
    ///
    /// assert_eq!(
    ///     builder.get_headers().unwrap(),
    ///     &["title".to_string(), "year".to_string()]
    /// );
    /// assert_eq!(
    ///     builder.get_data().unwrap(),
    ///     &vec![vec!["Acme, LLC".to_string(), "1994".to_string()]]
    /// );
    /// ```
    pub fn drop_columns(&mut self, columns: Vec<&str>) -> &mut Self {
        let columns_set: HashSet<&str> = columns.into_iter().collect();

        let remaining_headers = self
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !columns_set.contains(h.as_str()))
            .map(|(i, h)| (i, h.clone()))
            .collect::<Vec<(usize, String)>>();

        self.data = self
            .data
            .iter()
            .map(|row| {
                remaining_headers
                    .iter()
                    .filter_map(|(i, _)| row.get(*i).cloned())
                    .collect()
            })
            .collect();

        self.headers = remaining_headers.into_iter().map(|(_, h)| h).collect();

        self
    }

    /// Retains only the columns specified and orders them.
    ///
    /// ```
    /// use caselink::csv_utils::CsvBuilder;
    ///
    /// let mut builder = CsvBuilder::from_raw_data(
    ///     vec!["title".to_string(), "year".to_string(), "outcome".to_string()],
    ///     vec![vec!["Acme Corp".to_string(), "1994".to_string(), "Fair use found".to_string()]],
    /// );
    ///
    /// builder.retain_columns(vec!["outcome", "title"]);
    ///
    /// assert_eq!(
    ///     builder.get_headers().unwrap(),
    ///     &["outcome".to_string(), "title".to_string()]
    /// );
    /// assert_eq!(
    ///     builder.get_data().unwrap(),
    ///     &vec![vec!["Fair use found".to_string(), "Acme Corp".to_string()]]
    /// );
    /// ```
    pub fn retain_columns(&mut self, columns_to_retain: Vec<&str>) -> &mut Self {
        if self.error.is_some() {
            return self;
        }

        let header_map: HashMap<&str, usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.as_str(), i))
            .collect();

        let retained_headers: Vec<String> = columns_to_retain
            .iter()
            .filter_map(|&col| {
                if header_map.contains_key(col) {
                    Some(col.to_string())
                } else {
                    None
                }
            })
            .collect();

        let retained_data: Vec<Vec<String>> = self
            .data
            .iter()
            .map(|row| {
                columns_to_retain
                    .iter()
                    .filter_map(|&col| header_map.get(col).and_then(|&idx| row.get(idx).cloned()))
                    .collect()
            })
            .collect();

        self.headers = retained_headers;
        self.data = retained_data;

        self
    }

    /// Renames specified columns.
    ///
    /// ```
    /// use caselink::csv_utils::CsvBuilder;
    ///
    /// let mut builder = CsvBuilder::from_raw_data(
    ///     vec!["case".to_string(), "year".to_string()],
    ///     vec![vec!["Acme Corp v. Example, Inc.".to_string(), "1994".to_string()]],
    /// );
    ///
    /// builder.rename_columns(vec![("case", "name")]);
    ///
    /// assert_eq!(
    ///     builder.get_headers().unwrap(),
    ///     &["name".to_string(), "year".to_string()]
    /// );
    /// ```
    pub fn rename_columns(&mut self, renames: Vec<(&str, &str)>) -> &mut Self {
        let rename_map: HashMap<&str, &str> = renames.into_iter().collect();

        self.headers = self
            .headers
            .iter()
            .map(|h| {
                let h_str = h.as_str();
                rename_map.get(h_str).unwrap_or(&h_str).to_string()
            })
            .collect();

        self
    }

    /// Sorts rows by the given `(column, "ASC"|"DESC")` orders, cascading ties to the next order.
    /// Values that parse as numbers are compared numerically, everything else lexically.
    ///
    /// ```
    /// use caselink::csv_utils::CsvBuilder;
    ///
    /// let mut builder = CsvBuilder::from_raw_data(
    ///     vec!["case".to_string(), "year".to_string()],
    ///     vec![
    ///         vec!["Zeta Group v. Other".to_string(), "2001".to_string()],
    ///         vec!["Acme Corp v. Example".to_string(), "1994".to_string()],
    ///     ],
    /// );
    ///
    /// builder.cascade_sort(vec![("case".to_string(), "ASC".to_string())]);
    ///
    /// assert_eq!(builder.get_data().unwrap()[0][0], "Acme Corp v. Example");
    /// ```
    pub fn cascade_sort(&mut self, orders: Vec<(String, String)>) -> &mut Self {
        let column_indices: HashMap<&str, usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        self.data.sort_by(|a, b| {
            let mut cmp = std::cmp::Ordering::Equal;
            for (column_name, order) in &orders {
                if let Some(&index) = column_indices.get(column_name.as_str()) {
                    // Rows shorter than the headers sort as if the cell were empty
                    let a_val = a.get(index).map(|s| s.as_str()).unwrap_or("");
                    let b_val = b.get(index).map(|s| s.as_str()).unwrap_or("");

                    cmp = if let (Ok(a_num), Ok(b_num)) =
                        (a_val.parse::<f64>(), b_val.parse::<f64>())
                    {
                        if order == "ASC" {
                            a_num
                                .partial_cmp(&b_num)
                                .unwrap_or(std::cmp::Ordering::Equal)
                        } else {
                            b_num
                                .partial_cmp(&a_num)
                                .unwrap_or(std::cmp::Ordering::Equal)
                        }
                    } else if order == "ASC" {
                        a_val.cmp(b_val)
                    } else {
                        b_val.cmp(a_val)
                    };

                    if cmp != std::cmp::Ordering::Equal {
                        break;
                    }
                }
            }
            cmp
        });

        self
    }

    /// Removes duplicate rows, keeping the first occurrence of each.
    ///
    /// ```
    /// use caselink::csv_utils::CsvBuilder;
    ///
    /// let mut builder = CsvBuilder::from_raw_data(
    ///     vec!["title".to_string()],
    ///     vec![
    ///         vec!["Acme Corp".to_string()],
    ///         vec!["Acme Corp".to_string()],
    ///         vec!["Other Co".to_string()],
    ///     ],
    /// );
    ///
    /// builder.remove_duplicates();
    /// assert_eq!(builder.get_data().unwrap().len(), 2);
    /// ```
    pub fn remove_duplicates(&mut self) -> &mut Self {
        let original_count = self.data.len();
        let mut unique_rows = HashSet::new();
        self.data.retain(|row| unique_rows.insert(row.clone()));
        let duplicates_removed = original_count - unique_rows.len();

        println!("Number of duplicate rows removed: {}", duplicates_removed);

        self
    }

    /// Trims white spaces at the beginning and end of all cells in all columns.
    pub fn trim_all(&mut self) -> &mut Self {
        for row in &mut self.data {
            for item in row.iter_mut() {
                *item = item.trim().to_string();
            }
        }

        self
    }

    /// Saves data in the `CsvBuilder` to a new CSV file at `new_file_path`.
    ///
    /// ```
    /// use caselink::csv_utils::CsvBuilder;
    ///
    /// let tmp_file = tempfile::Builder::new()
    ///     .prefix("csv_save")
    ///     .suffix(".csv")
    ///     .tempfile()
    ///     .expect("failed to create temporary file");
    /// let path = tmp_file.path().to_str().unwrap().to_string();
    ///
    /// let mut builder = CsvBuilder::from_raw_data(
    ///     vec!["title".to_string(), "year".to_string()],
    ///     vec![vec!["Acme Corp".to_string(), "1994".to_string()]],
    /// );
    ///
    /// builder.save_as(&path).expect("save should succeed");
    ///
    /// let reloaded = CsvBuilder::from_csv(&path);
    /// assert_eq!(reloaded.get_data().unwrap().len(), 1);
    /// ```
    pub fn save_as(&mut self, new_file_path: &str) -> Result<&mut Self, Box<dyn Error>> {
        let file = File::create(new_file_path)?;
        let mut wtr = csv::Writer::from_writer(file);

        if !self.headers.is_empty() {
            wtr.write_record(&self.headers)?;
        }

        // Pad short rows so every record matches the header width
        let headers_len = self.headers.len();
        for record in &mut self.data {
            while record.len() < headers_len {
                record.push("".to_string());
            }

            wtr.write_record(record.iter())?;
        }

        wtr.flush()?;

        Ok(self)
    }

    /// Prints the table with lines and consistent spacing for cells, eliding the middle of
    /// large tables.
    pub fn print_table(&mut self) -> &mut Self {
        let show_rows = 5;
        let total_rows = self.data.len();
        let max_cell_width: usize = 45;

        let mut max_lengths = self
            .headers
            .iter()
            .map(|h| h.len() + 1)
            .collect::<Vec<usize>>();
        for row in self
            .data
            .iter()
            .take(show_rows)
            .chain(self.data.iter().skip(total_rows.saturating_sub(show_rows)))
        {
            for (i, cell) in row.iter().enumerate() {
                if i < max_lengths.len() {
                    let current_max = std::cmp::max(max_lengths[i], cell.len());
                    max_lengths[i] = std::cmp::min(current_max, max_cell_width);
                }
            }
        }

        let format_cell = |s: &String, max_length: usize| -> String {
            format!("{:width$.width$}", s, width = max_length)
        };

        let table_width = max_lengths.iter().map(|&len| len + 1).sum::<usize>() + 1;

        println!(
            "\n|{}|",
            self.headers
                .iter()
                .zip(max_lengths.iter())
                .map(|(header, &max_length)| format_cell(header, max_length))
                .collect::<Vec<String>>()
                .join("|")
        );
        println!("{}", "-".repeat(table_width));

        let print_row = |row: &Vec<String>| {
            println!(
                "|{}|",
                row.iter()
                    .zip(max_lengths.iter())
                    .map(|(cell, &max_length)| format_cell(cell, max_length))
                    .collect::<Vec<String>>()
                    .join("|")
            );
        };

        for row in self.data.iter().take(show_rows) {
            print_row(row);
        }

        if total_rows > 2 * show_rows {
            let omitted_row_count = total_rows - 2 * show_rows;
            let row_word = if omitted_row_count == 1 { "row" } else { "rows" };

            println!("<<+{} {}>>", omitted_row_count, row_word);
            for row in self.data.iter().skip(total_rows - show_rows) {
                print_row(row);
            }
        } else if total_rows > show_rows {
            for row in self.data.iter().skip(show_rows) {
                print_row(row);
            }
        }

        println!("Total rows: {}", total_rows);

        self
    }

    /// Prints the number of rows.
    pub fn print_row_count(&mut self) -> &mut Self {
        println!("Row count: {}", self.data.len());
        self
    }

    /// Prints the column names.
    pub fn print_columns(&mut self) -> &mut Self {
        println!("Columns: {}", self.headers.join(", "));
        self
    }

    /// Prints the unique values in the specified column.
    pub fn print_unique(&mut self, column_name: &str) -> &mut Self {
        if let Some(index) = self.headers.iter().position(|h| h == column_name) {
            let mut unique_values: HashSet<String> = HashSet::new();
            for row in &self.data {
                if let Some(value) = row.get(index) {
                    unique_values.insert(Self::clean_string_value(value));
                }
            }
            print!("Unique values in '{}': ", column_name);
            for (i, value) in unique_values.iter().enumerate() {
                if i > 0 {
                    print!(", ");
                }
                print!("{}", value);
            }
            println!();
        } else {
            println!("Column '{}' not found", column_name);
        }
        self
    }

    /// Prints the count of unique values in the specified column.
    pub fn print_unique_count(&mut self, column_name: &str) -> &mut Self {
        if let Some(index) = self.headers.iter().position(|h| h == column_name) {
            let mut unique_values: HashSet<String> = HashSet::new();
            for row in &self.data {
                if let Some(value) = row.get(index) {
                    unique_values.insert(Self::clean_string_value(value));
                }
            }
            println!(
                "Count of unique values in '{}': {}",
                column_name,
                unique_values.len()
            );
        } else {
            println!("Column '{}' not found", column_name);
        }
        self
    }

    /// Returns unique values for a specified column as a `Vec<String>`, with cleaner values.
    ///
    /// ```
    /// use caselink::csv_utils::CsvBuilder;
    ///
    /// let mut builder = CsvBuilder::from_raw_data(
    ///     vec!["outcome".to_string()],
    ///     vec![
    ///         vec!["Fair use found".to_string()],
    ///         vec!["Fair use not found".to_string()],
    ///         vec!["Fair use found".to_string()],
    ///     ],
    /// );
    ///
    /// let mut unique = builder.get_unique("outcome");
    /// unique.sort();
    /// assert_eq!(unique, vec!["Fair use found", "Fair use not found"]);
    /// ```
    pub fn get_unique(&mut self, column_name: &str) -> Vec<String> {
        let mut unique_values: HashSet<String> = HashSet::new();
        if let Some(index) = self.headers.iter().position(|h| h == column_name) {
            for row in &self.data {
                if let Some(value) = row.get(index) {
                    unique_values.insert(Self::clean_string_value(value));
                }
            }
        }
        unique_values.into_iter().collect()
    }

    /// Returns `true` if the builder holds at least one data row.
    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }

    /// Returns `true` if the builder holds at least one header.
    pub fn has_headers(&self) -> bool {
        !self.headers.is_empty()
    }

    /// Returns `true` if an earlier operation stored an error in the builder.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Returns the stored error message, if any.
    pub fn get_error(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }

    /// Returns the headers, if present.
    pub fn get_headers(&self) -> Option<&[String]> {
        if self.headers.is_empty() {
            None
        } else {
            Some(&self.headers)
        }
    }

    /// Returns the data rows, if present.
    pub fn get_data(&self) -> Option<&Vec<Vec<String>>> {
        if self.data.is_empty() {
            None
        } else {
            Some(&self.data)
        }
    }

    fn clean_string_value(value: &str) -> String {
        value.trim().trim_matches('"').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cascade_sort_numeric_then_lexical() {
        let mut builder = CsvBuilder::from_raw_data(
            vec!["case".to_string(), "year".to_string()],
            vec![
                vec!["B v. C".to_string(), "2001".to_string()],
                vec!["A v. B".to_string(), "2001".to_string()],
                vec!["C v. D".to_string(), "1994".to_string()],
            ],
        );

        builder.cascade_sort(vec![
            ("year".to_string(), "ASC".to_string()),
            ("case".to_string(), "ASC".to_string()),
        ]);

        let data = builder.get_data().unwrap();
        assert_eq!(data[0][0], "C v. D");
        assert_eq!(data[1][0], "A v. B");
        assert_eq!(data[2][0], "B v. C");
    }

    #[test]
    fn cascade_sort_tolerates_rows_shorter_than_headers() {
        let mut builder = CsvBuilder::new();
        builder
            .set_header(vec!["case", "year"])
            .add_row(vec!["B v. C", "2001"])
            .add_row(vec!["A v. B"]);

        builder.cascade_sort(vec![("year".to_string(), "ASC".to_string())]);

        let data = builder.get_data().unwrap();
        assert_eq!(data[0][0], "A v. B");
        assert_eq!(data[1][0], "B v. C");
    }

    #[test]
    fn drop_columns_preserves_row_shape() {
        let mut builder = CsvBuilder::from_raw_data(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            vec![vec!["1".to_string(), "2".to_string(), "3".to_string()]],
        );

        builder.drop_columns(vec!["b"]);

        assert_eq!(
            builder.get_headers().unwrap(),
            &["a".to_string(), "c".to_string()]
        );
        assert_eq!(
            builder.get_data().unwrap(),
            &vec![vec!["1".to_string(), "3".to_string()]]
        );
    }

    #[test]
    fn save_and_reload_round_trip() {
        let tmp = tempfile::Builder::new()
            .prefix("caselink_round_trip")
            .suffix(".csv")
            .tempfile()
            .expect("temp file");
        let path = tmp.path().to_str().unwrap().to_string();

        let mut builder = CsvBuilder::from_raw_data(
            vec!["title".to_string(), "year".to_string()],
            vec![
                vec!["Acme Corp".to_string(), "1994".to_string()],
                vec!["Other Co".to_string(), "2001".to_string()],
            ],
        );
        builder.save_as(&path).expect("save");

        let reloaded = CsvBuilder::from_csv(&path);
        assert_eq!(reloaded.get_headers(), builder.get_headers());
        assert_eq!(reloaded.get_data(), builder.get_data());
    }
}
