//! Route table
//!
//! Resolves `(method, path)` to a registered target. Distinguishes an unknown
//! path from a known path hit with the wrong method, and can suggest the
//! trailing-slash variant of a path that would have matched.

use std::collections::HashMap;

use hyper::Method;

use super::matcher::PathTemplate;

#[derive(Debug)]
struct RouteEntry<T> {
    method: Method,
    template: PathTemplate,
    target: T,
}

/// Outcome of resolving a request against the table
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution<T> {
    Matched {
        target: T,
        params: HashMap<String, String>,
    },
    MethodNotAllowed {
        allowed: Vec<Method>,
    },
    NotFound,
}

#[derive(Debug)]
pub struct Router<T> {
    routes: Vec<RouteEntry<T>>,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<T: Copy> Router<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route; earlier registrations win on overlap
    pub fn add(&mut self, method: Method, template: &str, target: T) {
        self.routes.push(RouteEntry {
            method,
            template: PathTemplate::parse(template),
            target,
        });
    }

    pub fn resolve(&self, method: &Method, path: &str) -> Resolution<T> {
        let mut allowed = Vec::new();

        for route in &self.routes {
            let Some(params) = route.template.matches(path) else {
                continue;
            };
            if route.method == *method {
                return Resolution::Matched {
                    target: route.target,
                    params,
                };
            }
            if !allowed.contains(&route.method) {
                allowed.push(route.method.clone());
            }
        }

        if allowed.is_empty() {
            Resolution::NotFound
        } else {
            Resolution::MethodNotAllowed { allowed }
        }
    }

    /// The same path with its trailing slash toggled, if that variant is routable
    pub fn redirect_target(&self, path: &str) -> Option<String> {
        if path == "/" {
            return None;
        }
        let alternate = path
            .strip_suffix('/')
            .map_or_else(|| format!("{path}/"), ToString::to_string);

        self.routes
            .iter()
            .any(|route| route.template.matches(&alternate).is_some())
            .then_some(alternate)
    }
}
