use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectorAttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
    StartsWith { key: String, value: String },
}

impl SelectorAttrCondition {
    fn matches(&self, element: &Element) -> bool {
        match self {
            Self::Exists { key } => element.attr(key).is_some(),
            Self::Eq { key, value } => element.attr(key) == Some(value.as_str()),
            Self::StartsWith { key, value } => element
                .attr(key)
                .is_some_and(|actual| actual.starts_with(value.as_str())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SelectorStep {
    pub(crate) tag: Option<String>,
    pub(crate) universal: bool,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) attrs: Vec<SelectorAttrCondition>,
}

impl SelectorStep {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && !self.universal
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
    }

    fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if !element.tag_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        self.classes
            .iter()
            .all(|class_name| has_class(element, class_name))
            && self.attrs.iter().all(|cond| cond.matches(element))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SelectorCombinator {
    Descendant,
    Child,
}

/// A compound step plus the combinator linking it to the step before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorPart {
    pub(crate) step: SelectorStep,
    pub(crate) combinator: Option<SelectorCombinator>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Selector {
    pub(crate) parts: Vec<SelectorPart>,
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector> {
    let unsupported = || Error::UnsupportedSelector(selector.to_string());
    let chars: Vec<char> = selector.trim().chars().collect();
    if chars.is_empty() {
        return Err(unsupported());
    }

    let mut parts = Vec::new();
    let mut step = SelectorStep::default();
    let mut pending: Option<SelectorCombinator> = None;
    let mut i = 0usize;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            ' ' | '\t' | '\n' | '>' => {
                let mut combinator = SelectorCombinator::Descendant;
                while i < chars.len() && matches!(chars[i], ' ' | '\t' | '\n' | '>') {
                    if chars[i] == '>' {
                        if combinator == SelectorCombinator::Child {
                            return Err(unsupported());
                        }
                        combinator = SelectorCombinator::Child;
                    }
                    i += 1;
                }
                if step.is_empty() {
                    return Err(unsupported());
                }
                parts.push(SelectorPart {
                    step: std::mem::take(&mut step),
                    combinator: pending.take(),
                });
                pending = Some(combinator);
                continue;
            }
            '*' => {
                if !step.is_empty() {
                    return Err(unsupported());
                }
                step.universal = true;
                i += 1;
            }
            '#' | '.' => {
                let (ident, next) = read_ident(&chars, i + 1);
                if ident.is_empty() {
                    return Err(unsupported());
                }
                if ch == '#' {
                    if step.id.is_some() {
                        return Err(unsupported());
                    }
                    step.id = Some(ident);
                } else {
                    step.classes.push(ident);
                }
                i = next;
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|c| *c == ']')
                    .map(|pos| i + pos)
                    .ok_or_else(unsupported)?;
                let body: String = chars[i + 1..close].iter().collect();
                step.attrs
                    .push(parse_attr_condition(&body).ok_or_else(unsupported)?);
                i = close + 1;
            }
            _ if is_ident_char(ch) => {
                if !step.is_empty() {
                    return Err(unsupported());
                }
                let (ident, next) = read_ident(&chars, i);
                step.tag = Some(ident.to_ascii_lowercase());
                i = next;
            }
            _ => return Err(unsupported()),
        }
    }

    if step.is_empty() {
        return Err(unsupported());
    }
    parts.push(SelectorPart {
        step,
        combinator: pending,
    });
    Ok(Selector { parts })
}

fn parse_attr_condition(body: &str) -> Option<SelectorAttrCondition> {
    let body = body.trim();
    let Some(eq) = body.find('=') else {
        let key = body.to_ascii_lowercase();
        return is_plain_ident(&key).then_some(SelectorAttrCondition::Exists { key });
    };

    let (raw_key, starts_with) = match body[..eq].strip_suffix('^') {
        Some(key) => (key, true),
        None => (&body[..eq], false),
    };
    let key = raw_key.trim().to_ascii_lowercase();
    if !is_plain_ident(&key) {
        return None;
    }

    let raw_value = body[eq + 1..].trim();
    let value = match raw_value.chars().next() {
        Some(quote @ ('"' | '\'')) => raw_value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))?
            .to_string(),
        Some(_) if is_plain_ident(raw_value) => raw_value.to_string(),
        _ => return None,
    };

    Some(if starts_with {
        SelectorAttrCondition::StartsWith { key, value }
    } else {
        SelectorAttrCondition::Eq { key, value }
    })
}

fn read_ident(chars: &[char], from: usize) -> (String, usize) {
    let mut i = from;
    while i < chars.len() && is_ident_char(chars[i]) {
        i += 1;
    }
    (chars[from..i].iter().collect(), i)
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '-' || ch == '_'
}

fn is_plain_ident(value: &str) -> bool {
    !value.is_empty() && value.chars().all(is_ident_char)
}

impl Selector {
    pub(crate) fn matches(&self, dom: &Dom, node_id: NodeId) -> bool {
        self.matches_from(dom, node_id, self.parts.len())
    }

    /// Whether `node_id` matches `parts[..len]` with the last part applied to
    /// the node itself.
    fn matches_from(&self, dom: &Dom, node_id: NodeId, len: usize) -> bool {
        let Some(part) = len.checked_sub(1).and_then(|idx| self.parts.get(idx)) else {
            return false;
        };
        let Some(element) = dom.element(node_id) else {
            return false;
        };
        if !part.step.matches(element) {
            return false;
        }

        match part.combinator {
            None => true,
            Some(SelectorCombinator::Child) => dom
                .parent(node_id)
                .is_some_and(|parent| self.matches_from(dom, parent, len - 1)),
            Some(SelectorCombinator::Descendant) => {
                let mut cursor = dom.parent(node_id);
                while let Some(ancestor) = cursor {
                    if self.matches_from(dom, ancestor, len - 1) {
                        return true;
                    }
                    cursor = dom.parent(ancestor);
                }
                false
            }
        }
    }
}

impl Dom {
    pub(crate) fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let selector = parse_selector(selector)?;
        Ok(self
            .all_elements()
            .into_iter()
            .filter(|node_id| selector.matches(self, *node_id))
            .collect())
    }

    pub(crate) fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }
}
