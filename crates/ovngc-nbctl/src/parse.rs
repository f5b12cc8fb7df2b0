//! Parsers for `ovn-nbctl` output

use std::collections::HashMap;

use ovngc_common::keys::PolicyKey;
use ovngc_common::model::{PortGroup, RoutePolicy, StaticRoute};
use ovngc_common::{Error, Result};

/// Non-empty trimmed lines of `--format=csv --data=bare --no-heading` output
/// for a single column.
pub fn parse_names(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|l| l.trim().trim_matches('"'))
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse an OVSDB map as printed by `get`: `{"k"="v", k2=v2}`.
pub fn parse_ovsdb_map(output: &str) -> Result<HashMap<String, String>> {
    let trimmed = output.trim();
    let inner = trimmed
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .ok_or_else(|| Error::parse("ovsdb map", trimmed))?;

    let mut map = HashMap::new();
    let mut chars = inner.chars().peekable();
    loop {
        while matches!(chars.peek(), Some(c) if c.is_whitespace() || *c == ',') {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }
        let key = read_atom(&mut chars, '=').ok_or_else(|| Error::parse("ovsdb map", trimmed))?;
        if chars.next() != Some('=') {
            return Err(Error::parse("ovsdb map", trimmed));
        }
        let value = read_atom(&mut chars, ',').ok_or_else(|| Error::parse("ovsdb map", trimmed))?;
        map.insert(key, value);
    }
    Ok(map)
}

/// Read a quoted string (with `\` escapes) or a bare run up to `stop`.
fn read_atom(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, stop: char) -> Option<String> {
    let mut atom = String::new();
    if chars.peek() == Some(&'"') {
        chars.next();
        loop {
            match chars.next()? {
                '\\' => atom.push(chars.next()?),
                '"' => return Some(atom),
                c => atom.push(c),
            }
        }
    }
    while let Some(&c) = chars.peek() {
        if c == stop {
            break;
        }
        atom.push(c);
        chars.next();
    }
    let atom = atom.trim().to_string();
    (!atom.is_empty()).then_some(atom)
}

/// Parse `--format=csv --data=bare --no-heading --columns=name,external_ids
/// find port_group` output. The owning policy comes from
/// `external_ids:np=<namespace>/<name>`.
pub fn parse_port_groups(output: &str) -> Vec<PortGroup> {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            let (name, external_ids) = line.split_once(',').unwrap_or((line, ""));
            let policy = external_ids
                .trim_matches('"')
                .split_whitespace()
                .find_map(|kv| kv.strip_prefix("np="))
                .and_then(PolicyKey::parse);
            Some(PortGroup {
                name: name.trim_matches('"').to_string(),
                policy,
            })
        })
        .collect()
}

/// Parse `lr-route-list <router>` output.
///
/// Route lines read `<prefix> <nexthop> [policy] [port] [flags]`; headers
/// such as `IPv4 Routes` and `Route Table <main>:` are skipped.
pub fn parse_route_list(output: &str) -> Result<Vec<StaticRoute>> {
    let mut routes = Vec::new();
    for line in output.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let (prefix, next_hop) = match fields.as_slice() {
            [] => continue,
            [.., last] if *last == "Routes" => continue,
            ["Route", "Table", ..] => continue,
            [prefix, next_hop, ..] => (*prefix, *next_hop),
            _ => return Err(Error::parse("static route", line)),
        };
        let policy = fields[2..]
            .iter()
            .find_map(|f| match *f {
                "src-ip" | "dst-ip" => f.parse::<RoutePolicy>().ok(),
                _ => None,
            })
            .unwrap_or_default();
        routes.push(StaticRoute {
            policy,
            cidr: prefix.to_string(),
            next_hop: next_hop.to_string(),
        });
    }
    Ok(routes)
}
