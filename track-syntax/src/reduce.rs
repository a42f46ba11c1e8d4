use crate::{Lexeme, Token};
use tracing::debug;

/// Working list entry: an operator that still has to be folded, or a
/// finished node.
enum Item {
    Open,
    Close,
    Not,
    Or,
    Node(Token),
}

impl From<Lexeme> for Item {
    fn from(lexeme: Lexeme) -> Self {
        match lexeme {
            Lexeme::Open => Item::Open,
            Lexeme::Close => Item::Close,
            Lexeme::Not => Item::Not,
            Lexeme::Or => Item::Or,
            Lexeme::Text(text) => Item::Node(Token::Leaf(text)),
        }
    }
}

fn into_node(item: Item) -> Option<Token> {
    match item {
        Item::Node(token) => Some(token),
        _ => None,
    }
}

/// Folds operators into structural tokens.
///
/// Each level is rewritten until nothing is left to fold, in a fixed
/// priority: parentheses first (their interior is reduced recursively), then
/// `!` (which takes exactly the following token), then `|` (which takes
/// exactly one token on each side, left associative). So `!` binds tighter
/// than `|`, and `|` tighter than the implicit AND.
///
/// Operators that cannot be folded are dropped: a `)` without `(`, a `!` with
/// no operand and a `|` missing a side. An unclosed `(` runs to the end of
/// the query.
///
/// ```
/// use track_syntax::{lex_query, reduce_tokens, Token};
///
/// let tokens = reduce_tokens(lex_query("a | ! b c"));
/// assert_eq!(
///     tokens,
///     [
///         Token::Or(
///             Box::new(Token::leaf("a")),
///             Box::new(Token::Not(Box::new(Token::leaf("b")))),
///         ),
///         Token::leaf("c"),
///     ]
/// );
/// ```
pub fn reduce_tokens(lexemes: Vec<Lexeme>) -> Vec<Token> {
    reduce_items(lexemes.into_iter().map(Item::from).collect())
}

fn reduce_items(mut items: Vec<Item>) -> Vec<Token> {
    loop {
        if items.is_empty() {
            return Vec::new();
        }

        if let Some(start) = items.iter().position(|item| matches!(item, Item::Open)) {
            let end = matching_close(&items, start);
            let after = match end {
                Some(end) => items.split_off(end + 1),
                None => {
                    debug!("unclosed '(' extends to the end of the query");
                    Vec::new()
                }
            };
            let mut inner = items.split_off(start + 1);
            if end.is_some() {
                inner.pop();
            }
            items.pop();
            items.push(Item::Node(Token::Group(reduce_items(inner))));
            items.extend(after);
            continue;
        }

        if items.iter().any(|item| matches!(item, Item::Close)) {
            debug!("dropping unbalanced ')'");
            items.retain(|item| !matches!(item, Item::Close));
            continue;
        }

        // `! ! a` folds the inner negation first, then the outer one
        let foldable_not = items.windows(2).position(|pair| {
            matches!(pair[0], Item::Not) && matches!(pair[1], Item::Node(_))
        });
        if let Some(index) = foldable_not {
            if let Some(operand) = into_node(items.remove(index + 1)) {
                items[index] = Item::Node(Token::Not(Box::new(operand)));
            }
            continue;
        }
        if items.iter().any(|item| matches!(item, Item::Not)) {
            debug!("dropping '!' without operand");
            items.retain(|item| !matches!(item, Item::Not));
            continue;
        }

        if let Some(index) = items.iter().position(|item| matches!(item, Item::Or)) {
            let has_left = index > 0 && matches!(items[index - 1], Item::Node(_));
            let has_right = matches!(items.get(index + 1), Some(Item::Node(_)));
            if has_left && has_right {
                let right = into_node(items.remove(index + 1));
                items.remove(index);
                let left = into_node(items.remove(index - 1));
                if let (Some(left), Some(right)) = (left, right) {
                    items.insert(
                        index - 1,
                        Item::Node(Token::Or(Box::new(left), Box::new(right))),
                    );
                }
            } else {
                debug!("dropping '|' without two operands");
                items.remove(index);
            }
            continue;
        }

        return items.into_iter().filter_map(into_node).collect();
    }
}

/// Index of the `)` closing the `(` at `start`, counting nested groups.
fn matching_close(items: &[Item], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, item) in items.iter().enumerate().skip(start + 1) {
        match item {
            Item::Open => depth += 1,
            Item::Close if depth == 0 => return Some(index),
            Item::Close => depth -= 1,
            _ => {}
        }
    }
    None
}
