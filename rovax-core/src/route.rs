use std::collections::HashMap;

use crate::position::Pose;

/// An ordered list of poses over the traversal plane.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Route {
    pub positions: Vec<Pose>,
}

impl Route {
    pub fn new(positions: Vec<Pose>) -> Self {
        Self { positions }
    }

    /// Push a pose onto the end of the route.
    pub fn push(&mut self, position: Pose) {
        self.positions.push(position);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Total distance over the route, pose to pose.
    pub fn length_dist(&self) -> f64 {
        if self.positions.len() < 2 {
            return 0.0;
        }

        let mut dist = 0.0;

        for i in 1..self.positions.len() {
            dist += self.positions[i].distance(&self.positions[i - 1]);
        }

        dist
    }
}

impl std::ops::Add for Route {
    type Output = Route;

    /// Join two routes back to back.
    fn add(mut self, rhs: Self) -> Self::Output {
        self.positions.extend(rhs.positions);
        self
    }
}

impl std::ops::Add<Pose> for Route {
    type Output = Route;

    /// Push a pose onto the end of the route.
    fn add(mut self, rhs: Pose) -> Self::Output {
        self.positions.push(rhs);
        self
    }
}

impl std::ops::Sub<usize> for Route {
    type Output = Route;

    /// Drop an amount of poses from the end of the route.
    fn sub(mut self, amt: usize) -> Self::Output {
        self.positions
            .truncate(self.positions.len().saturating_sub(amt));
        self
    }
}

/// A single step in a mission plan.
#[derive(Clone, Debug, PartialEq)]
pub enum RouteAction {
    /// Drive in a straight line for a distance.
    ///
    /// The distance is signed, negative drives backwards.
    Lateral {
        distance: f64,
        end_tolerance: f64,
        timeout: i64,
    },
    /// Rotate in place onto a heading in radians.
    Turn {
        angle: f64,
        end_tolerance: f64,
        timeout: i64,
    },
    /// Pursue a named route from the plan.
    ///
    /// A negative lookahead pursues the route in reverse.
    Follow {
        route_name: String,
        end_tolerance: f64,
        timeout: i64,
        lookahead: f64,
    },
    /// Run a named machine command.
    Command { name: String },
}

impl std::fmt::Display for RouteAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteAction::Lateral { distance, .. } => write!(f, "lateral {:.2}", distance),
            RouteAction::Turn { angle, .. } => write!(f, "turn {:.4}", angle),
            RouteAction::Follow {
                route_name,
                lookahead,
                ..
            } => write!(f, "follow {} lookahead {:.2}", route_name, lookahead),
            RouteAction::Command { name } => write!(f, "command {}", name),
        }
    }
}

/// A mission plan, named routes plus the actions over them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoutePlan {
    pub routes: HashMap<String, Route>,
    pub actions: Vec<RouteAction>,
}

impl RoutePlan {
    pub fn new(routes: HashMap<String, Route>, actions: Vec<RouteAction>) -> Self {
        Self { routes, actions }
    }

    /// Decode a mission plan from its textual form.
    ///
    /// The plan format is a flat whitespace separated token stream.
    /// Every action opens with its marker token followed by the
    /// action parameters:
    ///
    /// * `ps <distance> <tolerance> <timeout>` drives a straight line.
    /// * `ts <angle> <tolerance> <timeout>` turns onto a heading.
    /// * `cs <name>` runs a machine command.
    /// * `rs <tolerance> <timeout> <lookahead>` opens a route block of
    ///   `p <x> <y>` poses, closed by `re`, and pursues it.
    /// * `eof` ends the plan, trailing tokens are ignored.
    ///
    /// Route blocks are keyed by their ordinal. Unknown tokens are
    /// skipped. The decoder stops early on a malformed parameter,
    /// keeping every action decoded up to that point.
    pub fn decode(input: &str) -> Self {
        let mut tokens = input.split_whitespace();

        let mut routes = HashMap::new();
        let mut actions = Vec::new();
        let mut route_amt = 0;

        while let Some(token) = tokens.next() {
            match token {
                "rs" => {
                    let (end_tolerance, timeout, lookahead) = match (
                        next_value(&mut tokens),
                        next_value(&mut tokens),
                        next_value(&mut tokens),
                    ) {
                        (Some(x), Some(y), Some(z)) => (x, y as i64, z),
                        _ => break,
                    };

                    let mut positions = vec![];
                    while let Some(identifier) = tokens.next() {
                        match identifier {
                            "re" => break,
                            "p" => match (next_value(&mut tokens), next_value(&mut tokens)) {
                                (Some(x), Some(y)) => positions.push(Pose::new(x, y, 0.0)),
                                _ => break,
                            },
                            _ => {}
                        }
                    }

                    actions.push(RouteAction::Follow {
                        route_name: route_amt.to_string(),
                        end_tolerance,
                        timeout,
                        lookahead,
                    });
                    routes.insert(route_amt.to_string(), Route::new(positions));
                    route_amt += 1;
                }
                "ps" => match (
                    next_value(&mut tokens),
                    next_value(&mut tokens),
                    next_value(&mut tokens),
                ) {
                    (Some(x), Some(y), Some(z)) => actions.push(RouteAction::Lateral {
                        distance: x,
                        end_tolerance: y,
                        timeout: z as i64,
                    }),
                    _ => break,
                },
                "ts" => match (
                    next_value(&mut tokens),
                    next_value(&mut tokens),
                    next_value(&mut tokens),
                ) {
                    (Some(x), Some(y), Some(z)) => actions.push(RouteAction::Turn {
                        angle: x,
                        end_tolerance: y,
                        timeout: z as i64,
                    }),
                    _ => break,
                },
                "cs" => match tokens.next() {
                    Some(identifier) => actions.push(RouteAction::Command {
                        name: identifier.to_owned(),
                    }),
                    None => break,
                },
                "eof" => break,
                _ => {}
            }
        }

        Self { routes, actions }
    }
}

impl std::ops::Add for RoutePlan {
    type Output = RoutePlan;

    /// Merge two plans.
    ///
    /// Actions append in order. On a route key collision the left
    /// hand route wins.
    fn add(mut self, rhs: Self) -> Self::Output {
        for (name, route) in rhs.routes {
            self.routes.entry(name).or_insert(route);
        }
        self.actions.extend(rhs.actions);
        self
    }
}

impl std::ops::Add<RouteAction> for RoutePlan {
    type Output = RoutePlan;

    /// Append an action to the plan.
    fn add(mut self, rhs: RouteAction) -> Self::Output {
        self.actions.push(rhs);
        self
    }
}

impl std::ops::Sub<usize> for RoutePlan {
    type Output = RoutePlan;

    /// Drop an amount of actions from the end of the plan.
    fn sub(mut self, amt: usize) -> Self::Output {
        self.actions.truncate(self.actions.len().saturating_sub(amt));
        self
    }
}

fn next_value(tokens: &mut std::str::SplitWhitespace) -> Option<f64> {
    tokens.next().and_then(|token| token.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_dist() {
        let route = Route::new(vec![
            Pose::new(0.0, 0.0, 0.0),
            Pose::new(3.0, 4.0, 0.0),
            Pose::new(3.0, 14.0, 0.0),
        ]);
        assert_eq!(route.length_dist(), 15.0);

        assert_eq!(Route::new(vec![Pose::default()]).length_dist(), 0.0);
        assert_eq!(Route::default().length_dist(), 0.0);
    }

    #[test]
    fn test_route_ops() {
        let first = Route::new(vec![Pose::new(0.0, 0.0, 0.0), Pose::new(1.0, 0.0, 0.0)]);
        let second = Route::new(vec![Pose::new(2.0, 0.0, 0.0)]);

        let joined = first.clone() + second;
        assert_eq!(joined.positions.len(), 3);

        let pushed = first.clone() + Pose::new(8.0, 8.0, 0.0);
        assert_eq!(pushed.positions.len(), 3);
        assert_eq!(pushed.positions[2], Pose::new(8.0, 8.0, 0.0));

        let trimmed = first.clone() - 1;
        assert_eq!(trimmed.positions.len(), 1);

        let drained = first - 10;
        assert!(drained.positions.is_empty());
    }

    #[test]
    fn test_plan_ops() {
        let mut short = Route::default();
        short.push(Pose::new(0.0, 0.0, 0.0));
        short.push(Pose::new(12.0, 0.0, 0.0));
        assert_eq!(short.len(), 2);
        assert!(!short.is_empty());

        let long = Route::new(vec![
            Pose::new(0.0, 0.0, 0.0),
            Pose::new(12.0, 0.0, 0.0),
            Pose::new(24.0, 0.0, 0.0),
        ]);

        let mut routes = HashMap::new();
        routes.insert("0".to_owned(), short);
        let left = RoutePlan::new(
            routes,
            vec![RouteAction::Lateral {
                distance: 10.0,
                end_tolerance: 2.0,
                timeout: 500,
            }],
        );

        let mut routes = HashMap::new();
        routes.insert("0".to_owned(), long);
        let right = RoutePlan::new(
            routes,
            vec![RouteAction::Command {
                name: "bed_lift".to_owned(),
            }],
        );

        let merged = left + right;
        assert_eq!(merged.actions.len(), 2);
        assert_eq!(merged.routes["0"].len(), 2);

        let appended = merged
            + RouteAction::Turn {
                angle: 1.5,
                end_tolerance: 0.05,
                timeout: 2000,
            };
        assert_eq!(appended.actions.len(), 3);

        let trimmed = appended - 2;
        assert_eq!(trimmed.actions.len(), 1);
        assert!(matches!(trimmed.actions[0], RouteAction::Lateral { .. }));

        let drained = trimmed - 4;
        assert!(drained.actions.is_empty());
    }

    #[test]
    fn test_decode_lateral() {
        let plan = RoutePlan::decode("ps 10 2 500 eof");

        assert_eq!(plan.actions.len(), 1);
        assert_eq!(
            plan.actions[0],
            RouteAction::Lateral {
                distance: 10.0,
                end_tolerance: 2.0,
                timeout: 500,
            }
        );
        assert!(plan.routes.is_empty());
    }

    #[test]
    fn test_decode_plan() {
        let plan = RoutePlan::decode(
            "ts 1.57 0.05 2000 rs 2 3000 12 p 0 0 p 24 0 p 24 24 re cs unload eof ps 1 1 1",
        );

        assert_eq!(plan.actions.len(), 3);
        assert_eq!(
            plan.actions[0],
            RouteAction::Turn {
                angle: 1.57,
                end_tolerance: 0.05,
                timeout: 2000,
            }
        );
        assert_eq!(
            plan.actions[1],
            RouteAction::Follow {
                route_name: "0".to_owned(),
                end_tolerance: 2.0,
                timeout: 3000,
                lookahead: 12.0,
            }
        );
        assert_eq!(
            plan.actions[2],
            RouteAction::Command {
                name: "unload".to_owned(),
            }
        );

        let route = plan.routes.get("0").unwrap();
        assert_eq!(route.positions.len(), 3);
        assert_eq!(route.positions[1], Pose::new(24.0, 0.0, 0.0));
    }

    #[test]
    fn test_decode_skips_unknown_tokens() {
        let plan = RoutePlan::decode("noise rs 1 1000 8 junk p 5 5 re eof");

        assert_eq!(plan.actions.len(), 1);
        assert_eq!(plan.routes.get("0").unwrap().positions.len(), 1);
    }

    #[test]
    fn test_decode_malformed() {
        let plan = RoutePlan::decode("ps 10 2 500 ts nonsense");
        assert_eq!(plan.actions.len(), 1);

        assert_eq!(RoutePlan::decode(""), RoutePlan::default());
    }

    #[test]
    fn test_decode_route_ordinals() {
        let plan = RoutePlan::decode("rs 1 1000 8 p 0 0 re rs 1 1000 8 p 9 9 re eof");

        assert_eq!(plan.routes.len(), 2);
        assert!(plan.routes.contains_key("0"));
        assert!(plan.routes.contains_key("1"));
    }
}
