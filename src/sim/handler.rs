//! The set of forms a ball can hit
//!
//! Forms are immutable once built, so the handler stores them behind `Arc` and
//! clones cheaply. Scripted hooks replace whole forms by name.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::ball::Ball;
use super::collision::{Collision, earliest};
use super::context::SimContext;
use super::form::Form;

#[derive(Debug, Clone, Default)]
pub struct FormHandler {
    forms: Vec<Arc<Form>>,
    named: BTreeMap<String, Arc<Form>>,
}

impl FormHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_form(&mut self, form: impl Into<Arc<Form>>) {
        self.forms.push(form.into());
    }

    /// Insert or replace a form addressable by name
    pub fn set_named_form(&mut self, name: impl Into<String>, form: impl Into<Arc<Form>>) {
        self.named.insert(name.into(), form.into());
    }

    pub fn get_named_form(&self, name: &str) -> Option<&Arc<Form>> {
        self.named.get(name)
    }

    pub fn remove_named_form(&mut self, name: &str) -> Option<Arc<Form>> {
        let removed = self.named.remove(name);
        if removed.is_none() {
            log::warn!("remove_named_form: no form named {name:?}");
        }
        removed
    }

    /// Anonymous forms first, then named forms in name order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Form>> {
        self.forms.iter().chain(self.named.values())
    }

    pub fn len(&self) -> usize {
        self.forms.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Earliest collision of `ball` with any form not in `ignore`.
    ///
    /// `ignore` is matched by identity, so a ball's own obstacle form can be
    /// excluded without comparing geometry.
    pub fn find_collision(&self, ball: &Ball, ignore: &[Arc<Form>], ctx: &SimContext) -> Option<Collision> {
        let probe = ball.probe();
        self.iter()
            .filter(|form| !ignore.iter().any(|skip| Arc::ptr_eq(skip, form)))
            .fold(None, |best, form| earliest(best, form.collide(&probe, ctx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Point;
    use crate::sim::form::LineForm;
    use crate::sim::form::test_util::{moving, surface};

    fn wall(x: f64, name: &str) -> Form {
        Form::Line(LineForm::new(Point::new(x, -100.0), Point::new(x, 100.0), 5.0, surface(name)))
    }

    #[test]
    fn test_earliest_over_all_forms() {
        let ctx = SimContext::default();
        let mut forms = FormHandler::new();
        forms.add_form(wall(100.0, "far"));
        forms.set_named_form("gate", wall(50.0, "near"));
        let ball = moving(Point::ZERO, Point::new(10.0, 0.0), 0.0);
        let c = forms.find_collision(&ball, &[], &ctx).unwrap();
        assert_eq!(c.obj_form().name, "near");
        assert!((c.coll_t() - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_ignore_by_identity() {
        let ctx = SimContext::default();
        let near = Arc::new(wall(50.0, "near"));
        let mut forms = FormHandler::new();
        forms.add_form(Arc::clone(&near));
        forms.add_form(wall(100.0, "far"));
        let ball = moving(Point::ZERO, Point::new(10.0, 0.0), 0.0);
        let c = forms.find_collision(&ball, &[near], &ctx).unwrap();
        assert_eq!(c.obj_form().name, "far");

        // an equal but distinct form is not ignored
        let lookalike = Arc::new(wall(50.0, "near"));
        let c = forms.find_collision(&ball, &[lookalike], &ctx).unwrap();
        assert_eq!(c.obj_form().name, "near");
    }

    #[test]
    fn test_named_forms() {
        let mut forms = FormHandler::new();
        forms.set_named_form("gate", wall(50.0, "a"));
        forms.set_named_form("gate", wall(60.0, "b"));
        assert_eq!(forms.len(), 1);
        assert_eq!(forms.get_named_form("gate").unwrap().name(), "b");

        let copy = forms.clone();
        assert!(forms.remove_named_form("gate").is_some());
        assert!(forms.get_named_form("gate").is_none());
        assert!(forms.remove_named_form("gate").is_none());
        // clones are independent
        assert!(copy.get_named_form("gate").is_some());
        assert!(forms.is_empty());
    }

    #[test]
    fn test_empty_handler_finds_nothing() {
        let ball = moving(Point::ZERO, Point::new(1.0, 0.0), 0.0);
        assert!(FormHandler::new().find_collision(&ball, &[], &SimContext::default()).is_none());
    }
}
