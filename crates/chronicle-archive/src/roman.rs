//! Roman numerals for positional labels within a year group.

const NUMERALS: &[(usize, &str)] =
  &[(10, "X"), (9, "IX"), (5, "V"), (4, "IV"), (1, "I")];

/// Render `n` with the subtractive forms up to ten and additive tens above
/// that (`12 -> "XII"`, `40 -> "XXXX"`). Zero renders as `"0"`.
pub fn to_roman(n: usize) -> String {
  let mut out = String::new();
  let mut rest = n;
  for &(value, numeral) in NUMERALS {
    while rest >= value {
      out.push_str(numeral);
      rest -= value;
    }
  }
  if out.is_empty() {
    out.push('0');
  }
  out
}
