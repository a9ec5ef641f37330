/* Case conversion for generated identifiers */

/// `transferFrom` -> `transfer_from`, `ERC20Token` -> `erc20_token`.
pub fn snake_case(name: &str) -> String {
  let chars: Vec<char> = name.chars().collect();
  let mut out = String::with_capacity(name.len() + 4);
  for (idx, ch) in chars.iter().enumerate() {
    if !ch.is_ascii_alphanumeric() {
      if !out.ends_with('_') || out.is_empty() {
        out.push('_');
      }
      continue;
    }
    if ch.is_ascii_uppercase() && idx > 0 {
      let prev = chars[idx - 1];
      let next_lower = chars.get(idx + 1).is_some_and(|c| c.is_ascii_lowercase());
      let boundary = prev.is_ascii_lowercase()
        || prev.is_ascii_digit()
        || (prev.is_ascii_uppercase() && next_lower);
      if boundary && !out.ends_with('_') {
        out.push('_');
      }
    }
    out.push(ch.to_ascii_lowercase());
  }
  out
}

/// `transfer_from` / `transferFrom` -> `TransferFrom`.
pub fn camel_case(name: &str) -> String {
  let mut out = String::with_capacity(name.len());
  for part in snake_case(name).split('_').filter(|part| !part.is_empty()) {
    let mut chars = part.chars();
    if let Some(first) = chars.next() {
      out.push(first.to_ascii_uppercase());
      out.extend(chars);
    }
  }
  out
}

pub fn upper_snake_case(name: &str) -> String {
  snake_case(name).trim_matches('_').to_ascii_uppercase()
}

/* Declared struct names keep their own casing; only the first letter is
 * forced upper so the result is a valid type name. */
pub fn type_name(declared: &str) -> String {
  let cleaned: String = declared
    .chars()
    .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
    .collect();
  let mut chars = cleaned.chars();
  match chars.next() {
    Some(first) if first.is_ascii_alphabetic() => {
      let mut out = String::with_capacity(cleaned.len());
      out.push(first.to_ascii_uppercase());
      out.extend(chars);
      out
    }
    Some(_) => format!("T{cleaned}"),
    None => "Tuple".to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn snake() {
    assert_eq!(snake_case("transferFrom"), "transfer_from");
    assert_eq!(snake_case("ERC20Token"), "erc20_token");
    assert_eq!(snake_case("balanceOf"), "balance_of");
    assert_eq!(snake_case("_owner"), "_owner");
    assert_eq!(snake_case("URI"), "uri");
  }

  #[test]
  fn camel() {
    assert_eq!(camel_case("transfer_from"), "TransferFrom");
    assert_eq!(camel_case("balanceOf"), "BalanceOf");
    assert_eq!(camel_case("uint256_array2"), "Uint256Array2");
    assert_eq!(upper_snake_case("transferFrom"), "TRANSFER_FROM");
  }

  #[test]
  fn declared_type_names() {
    assert_eq!(type_name("Order"), "Order");
    assert_eq!(type_name("order_v2"), "Order_v2");
    assert_eq!(type_name("2fa"), "T2fa");
  }
}
