use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use flooring_orders::codec::DATE_FORMAT;
use flooring_orders::{HEADER, Order, marshal, unmarshal};

use super::r#trait::{OrderStore, StoreError, ensure_same_identity, locate};
use crate::fs::write_atomically;

const FILE_PREFIX: &str = "Orders_";
const FILE_SUFFIX: &str = ".txt";

/// File name of the partition for `date` (`Orders_MMDDYYYY.txt`).
pub fn file_name(date: NaiveDate) -> String {
    format!("{FILE_PREFIX}{}{FILE_SUFFIX}", date.format(DATE_FORMAT))
}

/// Inverse of [`file_name`]; `None` for anything that is not an order file.
pub fn parse_file_name(name: &str) -> Option<NaiveDate> {
    let stamp = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
    if stamp.len() != 8 || !stamp.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let month = stamp[0..2].parse().ok()?;
    let day = stamp[2..4].parse().ok()?;
    let year = stamp[4..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `raw` without its trailing `\n` or `\r\n`.
fn content_of(raw: &str) -> &str {
    match raw.strip_suffix('\n') {
        Some(line) => line.strip_suffix('\r').unwrap_or(line),
        None => raw,
    }
}

/// The `\n` / `\r\n` ending `raw`, or `""` for an unterminated last line.
fn terminator_of(raw: &str) -> &str {
    &raw[content_of(raw).len()..]
}

/// One physical line as read, terminator included.
#[derive(Debug)]
enum Line {
    /// Header or blank line; written back untouched.
    Passthrough(String),
    Record { raw: String, order: Order },
}

impl Line {
    fn raw(&self) -> &str {
        match self {
            Line::Passthrough(raw) | Line::Record { raw, .. } => raw,
        }
    }

    fn order(&self) -> Option<&Order> {
        match self {
            Line::Record { order, .. } => Some(order),
            Line::Passthrough(_) => None,
        }
    }
}

/// A partition file split into lines. Rendering concatenates the raw lines,
/// so anything not explicitly replaced or removed comes back byte for byte.
#[derive(Debug)]
struct Partition {
    lines: Vec<Line>,
}

impl Partition {
    fn parse(contents: &str, path: &Path) -> Result<Self, StoreError> {
        let mut lines = Vec::new();
        for (idx, raw) in contents.split_inclusive('\n').enumerate() {
            let content = content_of(raw);
            if content.trim().is_empty() || (idx == 0 && content.trim() == HEADER) {
                lines.push(Line::Passthrough(raw.to_string()));
                continue;
            }

            let order = unmarshal(content).map_err(|source| StoreError::Parse {
                location: format!("{}:{}", path.display(), idx + 1),
                source,
            })?;
            if idx == 0 {
                warn!(path = %path.display(), "partition has no header line");
            }
            lines.push(Line::Record {
                raw: raw.to_string(),
                order,
            });
        }
        Ok(Self { lines })
    }

    fn render(&self) -> String {
        self.lines.iter().map(Line::raw).collect()
    }

    fn into_orders(self) -> Vec<Order> {
        self.lines
            .into_iter()
            .filter_map(|line| match line {
                Line::Record { order, .. } => Some(order),
                Line::Passthrough(_) => None,
            })
            .collect()
    }

    /// Index into `lines` of the record matching `target`.
    fn position(&self, target: &Order) -> Option<usize> {
        let (indices, orders): (Vec<usize>, Vec<&Order>) = self
            .lines
            .iter()
            .enumerate()
            .filter_map(|(idx, line)| line.order().map(|order| (idx, order)))
            .unzip();
        locate(orders, target).map(|k| indices[k])
    }

    /// Replace the line at `idx`, keeping its line ending.
    fn replace(&mut self, idx: usize, order: &Order) {
        let raw = format!("{}{}", marshal(order), terminator_of(self.lines[idx].raw()));
        self.lines[idx] = Line::Record {
            raw,
            order: order.clone(),
        };
    }
}

/// Line ending of the last line in `file`; `None` when the file does not end
/// with one.
fn trailing_line_ending(file: &mut File, len: u64) -> io::Result<Option<&'static str>> {
    let n = len.min(2) as usize;
    let mut tail = [0u8; 2];
    file.seek(SeekFrom::End(-(n as i64)))?;
    file.read_exact(&mut tail[..n])?;
    Ok(match &tail[..n] {
        [b'\r', b'\n'] => Some("\r\n"),
        [.., b'\n'] => Some("\n"),
        _ => None,
    })
}

/// Flat-file order store: one header-prefixed file per order date inside a
/// single directory.
///
/// Edits and removals rewrite the whole partition through a temp file and a
/// rename, so an interrupted rewrite leaves the previous file intact. Lines
/// other than the edited one are written back exactly as read, line endings
/// and blank lines included.
#[derive(Debug, Clone)]
pub struct FileOrderStore {
    dir: PathBuf,
}

impl FileOrderStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the partition file for `date` (which may not exist yet).
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(file_name(date))
    }

    fn load(&self, date: NaiveDate) -> Result<Option<Partition>, StoreError> {
        let path = self.path_for(date);
        let contents = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::persistence(
                    format!("reading {}", path.display()),
                    e,
                ));
            }
        };

        Partition::parse(&contents, &path).map(Some)
    }

    fn store(&self, date: NaiveDate, partition: &Partition) -> Result<(), StoreError> {
        let path = self.path_for(date);
        write_atomically(&path, partition.render().as_bytes())
            .map_err(|e| StoreError::persistence(format!("rewriting {}", path.display()), e))
    }

    /// Load the partition and find the line matching `target`.
    fn load_matching(
        &self,
        date: NaiveDate,
        target: &Order,
    ) -> Result<(Partition, usize), StoreError> {
        let not_found = || StoreError::order_not_found(date, target.order_number);
        let partition = self.load(date)?.ok_or_else(not_found)?;
        let idx = partition.position(target).ok_or_else(not_found)?;
        Ok((partition, idx))
    }
}

impl OrderStore for FileOrderStore {
    fn read_all(&self, date: NaiveDate) -> Result<Vec<Order>, StoreError> {
        Ok(self
            .load(date)?
            .map(Partition::into_orders)
            .unwrap_or_default())
    }

    fn append(&self, date: NaiveDate, order: &Order) -> Result<(), StoreError> {
        let path = self.path_for(date);
        let context = || format!("appending to {}", path.display());

        std::fs::create_dir_all(&self.dir).map_err(|e| StoreError::persistence(context(), e))?;
        let mut file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::persistence(context(), e))?;
        let len = file
            .metadata()
            .map_err(|e| StoreError::persistence(context(), e))?
            .len();

        let mut buf = String::new();
        let ending = if len == 0 {
            buf.push_str(HEADER);
            buf.push('\n');
            "\n"
        } else {
            match trailing_line_ending(&mut file, len)
                .map_err(|e| StoreError::persistence(context(), e))?
            {
                Some(ending) => ending,
                None => {
                    // Unterminated last line: close it before appending.
                    buf.push('\n');
                    "\n"
                }
            }
        };
        buf.push_str(&marshal(order));
        buf.push_str(ending);

        file.write_all(buf.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| StoreError::persistence(context(), e))?;

        debug!(order_number = %order.order_number, %date, new_file = len == 0, "order appended");
        Ok(())
    }

    fn edit(&self, date: NaiveDate, old: &Order, new: &Order) -> Result<(), StoreError> {
        ensure_same_identity(old, new)?;
        let (mut partition, idx) = self.load_matching(date, old)?;

        partition.replace(idx, new);
        self.store(date, &partition)?;

        info!(order_number = %new.order_number, %date, "order edited");
        Ok(())
    }

    fn remove(&self, date: NaiveDate, order: &Order) -> Result<(), StoreError> {
        let (mut partition, idx) = self.load_matching(date, order)?;

        partition.lines.remove(idx);
        self.store(date, &partition)?;

        info!(order_number = %order.order_number, %date, "order removed");
        Ok(())
    }

    fn dates(&self) -> Result<Vec<NaiveDate>, StoreError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::persistence(
                    format!("listing {}", self.dir.display()),
                    e,
                ));
            }
        };

        let mut dates = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                StoreError::persistence(format!("listing {}", self.dir.display()), e)
            })?;
            let name = entry.file_name();
            if let Some(date) = name.to_str().and_then(parse_file_name) {
                dates.push(date);
            }
        }
        dates.sort_unstable();
        Ok(dates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TempDir;
    use flooring_catalog::{Product, State};
    use flooring_core::OrderNumber;
    use flooring_orders::compute_order;
    use rust_decimal_macros::dec;

    fn date(m: u32, d: u32, y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn order(number: u32, name: &str) -> Order {
        compute_order(
            name,
            "OH",
            "Wood",
            dec!(500),
            &Product::new("Wood", dec!(5.15), dec!(4.75)),
            &State::new("OH", "Ohio", dec!(7)),
        )
        .unwrap()
        .assign(OrderNumber::new(number).unwrap())
    }

    fn read_file(store: &FileOrderStore, date: NaiveDate) -> String {
        std::fs::read_to_string(store.path_for(date)).unwrap()
    }

    #[test]
    fn file_names_round_trip_through_dates() {
        let d = date(1, 1, 2050);
        assert_eq!(file_name(d), "Orders_01012050.txt");
        assert_eq!(parse_file_name("Orders_01012050.txt"), Some(d));
        assert_eq!(parse_file_name("Orders_13012050.txt"), None);
        assert_eq!(parse_file_name("Orders_0101205.txt"), None);
        assert_eq!(parse_file_name("DataExport.txt"), None);
        assert_eq!(parse_file_name(".Orders_01012050.txt.tmp"), None);
    }

    #[test]
    fn missing_partition_reads_as_empty() {
        let tmp = TempDir::new();
        let store = FileOrderStore::new(tmp.path().join("Orders"));

        assert!(store.read_all(date(6, 2, 2030)).unwrap().is_empty());
        assert!(store.dates().unwrap().is_empty());
        assert_eq!(store.generate_next_order_number().unwrap(), OrderNumber::FIRST);
    }

    #[test]
    fn append_creates_file_with_header() {
        let tmp = TempDir::new();
        let store = FileOrderStore::new(tmp.path().join("Orders"));
        let d = date(6, 2, 2030);

        store.append(d, &order(1, "Ada")).unwrap();
        store.append(d, &order(2, "Grace")).unwrap();

        let contents = read_file(&store, d);
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[1], marshal(&order(1, "Ada")));
        assert_eq!(lines[2], marshal(&order(2, "Grace")));
        assert_eq!(store.read_all(d).unwrap(), vec![order(1, "Ada"), order(2, "Grace")]);
    }

    #[test]
    fn get_finds_by_number_or_reports_not_found() {
        let tmp = TempDir::new();
        let store = FileOrderStore::new(tmp.path());
        let d = date(6, 2, 2030);
        store.append(d, &order(4, "Ada")).unwrap();

        assert_eq!(store.get(d, OrderNumber::new(4).unwrap()).unwrap(), order(4, "Ada"));
        assert!(matches!(
            store.get(d, OrderNumber::new(5).unwrap()),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.get(date(6, 3, 2030), OrderNumber::new(4).unwrap()),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn next_number_is_global_across_partitions() {
        let tmp = TempDir::new();
        let store = FileOrderStore::new(tmp.path());

        store.append(date(1, 1, 2050), &order(1, "A")).unwrap();
        store.append(date(1, 2, 2050), &order(2, "B")).unwrap();
        store.append(date(1, 2, 2050), &order(3, "C")).unwrap();
        store.append(date(1, 1, 2050), &order(4, "D")).unwrap();

        assert_eq!(store.generate_next_order_number().unwrap().get(), 5);
    }

    #[test]
    fn next_number_uses_the_maximum_not_the_last_seen() {
        let tmp = TempDir::new();
        let store = FileOrderStore::new(tmp.path());

        store.append(date(1, 1, 2050), &order(9, "A")).unwrap();
        store.append(date(1, 1, 2050), &order(3, "B")).unwrap();

        assert_eq!(store.generate_next_order_number().unwrap().get(), 10);
    }

    #[test]
    fn edit_replaces_only_the_target_line() {
        let tmp = TempDir::new();
        let store = FileOrderStore::new(tmp.path());
        let d = date(1, 1, 2050);

        // Same pricing, names differ only by a suffix; a substring match on
        // "Ann" would hit both records.
        let ann = order(1, "Ann");
        let anne = order(2, "Anne");
        store.append(d, &ann).unwrap();
        store.append(d, &anne).unwrap();
        let before = read_file(&store, d);

        let mut edited = ann.clone();
        edited.customer_name = "Zed".to_string();
        store.edit(d, &ann, &edited).unwrap();

        let after = read_file(&store, d);
        let before_lines: Vec<&str> = before.lines().collect();
        let after_lines: Vec<&str> = after.lines().collect();
        assert_eq!(after_lines.len(), before_lines.len());
        assert_eq!(after_lines[0], before_lines[0]);
        assert_eq!(after_lines[1], marshal(&edited));
        assert_eq!(after_lines[2], before_lines[2]);
        assert_eq!(store.read_all(d).unwrap(), vec![edited, anne]);
    }

    #[test]
    fn edit_preserves_untouched_lines_verbatim() {
        let tmp = TempDir::new();
        let store = FileOrderStore::new(tmp.path());
        let d = date(1, 1, 2050);
        let legacy = "7,Jim Bob,TX,6.25,Laminate,1000.5,1.75,2.10,1750.88,2101.05,240.70,4092.63";
        std::fs::write(
            store.path_for(d),
            format!("{HEADER}\n{legacy}\n{}\n", marshal(&order(8, "Ada"))),
        )
        .unwrap();

        let target = order(8, "Ada");
        let mut edited = target.clone();
        edited.customer_name = "Ada King".to_string();
        store.edit(d, &target, &edited).unwrap();

        let contents = read_file(&store, d);
        assert!(contents.lines().any(|l| l == legacy));
        assert!(contents.lines().any(|l| l == marshal(&edited)));
    }

    #[test]
    fn edit_requires_a_matching_record() {
        let tmp = TempDir::new();
        let store = FileOrderStore::new(tmp.path());
        let d = date(1, 1, 2050);
        store.append(d, &order(1, "Ann")).unwrap();

        // Same number, stale contents.
        let stale = order(1, "Someone Else");
        assert!(matches!(
            store.edit(d, &stale, &order(1, "New")),
            Err(StoreError::NotFound(_))
        ));
        // Missing partition.
        assert!(matches!(
            store.edit(date(2, 2, 2050), &order(1, "Ann"), &order(1, "New")),
            Err(StoreError::NotFound(_))
        ));
        assert_eq!(store.read_all(d).unwrap(), vec![order(1, "Ann")]);
    }

    #[test]
    fn edit_cannot_change_order_number() {
        let tmp = TempDir::new();
        let store = FileOrderStore::new(tmp.path());
        let d = date(1, 1, 2050);
        store.append(d, &order(1, "Ann")).unwrap();

        assert!(matches!(
            store.edit(d, &order(1, "Ann"), &order(2, "Ann")),
            Err(StoreError::InvalidEdit(_))
        ));
    }

    #[test]
    fn remove_deletes_exactly_one_line() {
        let tmp = TempDir::new();
        let store = FileOrderStore::new(tmp.path());
        let d = date(1, 1, 2050);
        store.append(d, &order(1, "Ann")).unwrap();
        store.append(d, &order(2, "Anne")).unwrap();
        store.append(d, &order(3, "Ann")).unwrap();

        store.remove(d, &order(1, "Ann")).unwrap();

        assert_eq!(store.read_all(d).unwrap(), vec![order(2, "Anne"), order(3, "Ann")]);
        assert!(read_file(&store, d).starts_with(HEADER));
    }

    #[test]
    fn removing_a_missing_order_is_not_found() {
        let tmp = TempDir::new();
        let store = FileOrderStore::new(tmp.path());
        let d = date(1, 1, 2050);
        store.append(d, &order(1, "Ann")).unwrap();

        assert!(matches!(
            store.remove(d, &order(2, "Ann")),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.remove(date(3, 3, 2050), &order(1, "Ann")),
            Err(StoreError::NotFound(_))
        ));
        assert_eq!(store.read_all(d).unwrap().len(), 1);
    }

    #[test]
    fn removing_the_last_order_keeps_an_empty_partition() {
        let tmp = TempDir::new();
        let store = FileOrderStore::new(tmp.path());
        let d = date(1, 1, 2050);
        store.append(d, &order(1, "Ann")).unwrap();

        store.remove(d, &order(1, "Ann")).unwrap();

        assert_eq!(read_file(&store, d), format!("{HEADER}\n"));
        assert_eq!(store.dates().unwrap(), vec![d]);
        store.append(d, &order(2, "Bo")).unwrap();
        assert_eq!(read_file(&store, d).lines().count(), 2);
    }

    #[test]
    fn malformed_line_reports_location() {
        let tmp = TempDir::new();
        let store = FileOrderStore::new(tmp.path());
        let d = date(1, 1, 2050);
        std::fs::write(store.path_for(d), format!("{HEADER}\n1,broken\n")).unwrap();

        match store.read_all(d) {
            Err(StoreError::Parse { location, .. }) => assert!(location.ends_with(":2")),
            other => panic!("Expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn dates_ignore_unrelated_files_and_sort() {
        let tmp = TempDir::new();
        let store = FileOrderStore::new(tmp.path());
        store.append(date(3, 1, 2051), &order(1, "A")).unwrap();
        store.append(date(12, 31, 2050), &order(2, "B")).unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "hello").unwrap();

        assert_eq!(store.dates().unwrap(), vec![date(12, 31, 2050), date(3, 1, 2051)]);
    }

    #[test]
    fn append_closes_an_unterminated_last_line() {
        let tmp = TempDir::new();
        let store = FileOrderStore::new(tmp.path());
        let d = date(1, 1, 2050);
        std::fs::write(store.path_for(d), format!("{HEADER}\n{}", marshal(&order(1, "Ann")))).unwrap();

        store.append(d, &order(2, "Bo")).unwrap();

        assert_eq!(
            read_file(&store, d),
            format!("{HEADER}\n{}\n{}\n", marshal(&order(1, "Ann")), marshal(&order(2, "Bo")))
        );
        assert_eq!(store.read_all(d).unwrap(), vec![order(1, "Ann"), order(2, "Bo")]);
        assert_eq!(store.generate_next_order_number().unwrap().get(), 3);
    }

    #[test]
    fn append_follows_crlf_line_endings() {
        let tmp = TempDir::new();
        let store = FileOrderStore::new(tmp.path());
        let d = date(1, 1, 2050);
        std::fs::write(store.path_for(d), format!("{HEADER}\r\n{}\r\n", marshal(&order(1, "Ann")))).unwrap();

        store.append(d, &order(2, "Bo")).unwrap();

        assert_eq!(
            read_file(&store, d),
            format!("{HEADER}\r\n{}\r\n{}\r\n", marshal(&order(1, "Ann")), marshal(&order(2, "Bo")))
        );
    }

    #[test]
    fn edit_keeps_crlf_lines_byte_identical() {
        let tmp = TempDir::new();
        let store = FileOrderStore::new(tmp.path());
        let d = date(1, 1, 2050);
        let ann = marshal(&order(1, "Ann"));
        std::fs::write(
            store.path_for(d),
            format!("{HEADER}\r\n{ann}\r\n{}\r\n", marshal(&order(2, "Bo"))),
        )
        .unwrap();

        store.edit(d, &order(2, "Bo"), &order(2, "Cy")).unwrap();

        assert_eq!(
            read_file(&store, d),
            format!("{HEADER}\r\n{ann}\r\n{}\r\n", marshal(&order(2, "Cy")))
        );
    }

    #[test]
    fn rewrites_keep_blank_lines_and_missing_final_newline() {
        let tmp = TempDir::new();
        let store = FileOrderStore::new(tmp.path());
        let d = date(1, 1, 2050);
        let ann = marshal(&order(1, "Ann"));
        let bo = marshal(&order(2, "Bo"));
        std::fs::write(store.path_for(d), format!("{HEADER}\n\n{ann}\n\n{bo}")).unwrap();

        store.edit(d, &order(2, "Bo"), &order(2, "Cy")).unwrap();
        assert_eq!(
            read_file(&store, d),
            format!("{HEADER}\n\n{ann}\n\n{}", marshal(&order(2, "Cy")))
        );

        store.remove(d, &order(1, "Ann")).unwrap();
        assert_eq!(
            read_file(&store, d),
            format!("{HEADER}\n\n\n{}", marshal(&order(2, "Cy")))
        );
    }

    #[test]
    fn headerless_partition_keeps_its_first_record() {
        let tmp = TempDir::new();
        let store = FileOrderStore::new(tmp.path());
        let d = date(1, 1, 2050);
        std::fs::write(
            store.path_for(d),
            format!("{}\n{}\n", marshal(&order(7, "Ann")), marshal(&order(2, "Bo"))),
        )
        .unwrap();

        assert_eq!(store.read_all(d).unwrap(), vec![order(7, "Ann"), order(2, "Bo")]);
        assert_eq!(store.generate_next_order_number().unwrap().get(), 8);
    }

    #[test]
    fn unrecognised_first_line_is_a_parse_error() {
        let tmp = TempDir::new();
        let store = FileOrderStore::new(tmp.path());
        let d = date(1, 1, 2050);
        std::fs::write(
            store.path_for(d),
            format!("Number,Name\n{}\n", marshal(&order(1, "Ann"))),
        )
        .unwrap();

        match store.read_all(d) {
            Err(StoreError::Parse { location, .. }) => assert!(location.ends_with(":1")),
            other => panic!("Expected Parse error, got {other:?}"),
        }
    }
}
