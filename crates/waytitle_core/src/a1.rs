/// Convert 1-based row/column coordinates to an A1 cell reference,
/// e.g. `(2, 3)` -> `"C2"`, `(1, 27)` -> `"AA1"`.
pub fn rowcol_to_a1(row: u32, col: u32) -> String {
    debug_assert!(row >= 1 && col >= 1, "A1 coordinates are 1-based");
    let mut letters = Vec::new();
    let mut n = col;
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push(b'A' + rem);
        n = (n - 1) / 26;
    }
    letters.reverse();
    let column_ref = String::from_utf8(letters).unwrap_or_else(|_| "A".to_string());
    format!("{column_ref}{row}")
}
