//! Depth-first traversal over the schema model.
//!
//! Modelled after `syn::visit`: every node kind has a trait method whose
//! default implementation calls the free function of the same name, which
//! recurses into children. Override a method to observe a node, and call the
//! free function from the override to keep descending:
//!
//! ```ignore
//! impl<'ast> Visit<'ast> for Depth {
//!     fn visit_message(&mut self, node: &'ast Message) {
//!         self.depth += 1;
//!         visit::visit_message(self, node); // children
//!         self.depth -= 1;
//!     }
//! }
//! ```
//!
//! Code placed after the recursive call runs only once the whole subtree has
//! been visited.

use crate::schema::{Element, Enum, Group, Message, Oneof, ProtoFile, Rpc, Service};

/// A visitor over a borrowed [`ProtoFile`].
#[allow(unused_variables)]
pub trait Visit<'ast> {
    /// Visits a whole file.
    fn visit_file(&mut self, node: &'ast ProtoFile) {
        visit_file(self, node);
    }

    /// Visits any declaration.
    fn visit_element(&mut self, node: &'ast Element) {
        visit_element(self, node);
    }

    /// Visits a message or `extend` block.
    fn visit_message(&mut self, node: &'ast Message) {
        visit_message(self, node);
    }

    /// Visits a service.
    fn visit_service(&mut self, node: &'ast Service) {
        visit_service(self, node);
    }

    /// Visits an RPC. RPCs have no children.
    fn visit_rpc(&mut self, node: &'ast Rpc) {}

    /// Visits an enum.
    fn visit_enum(&mut self, node: &'ast Enum) {
        visit_enum(self, node);
    }

    /// Visits a oneof block.
    fn visit_oneof(&mut self, node: &'ast Oneof) {
        visit_oneof(self, node);
    }

    /// Visits a proto2 group.
    fn visit_group(&mut self, node: &'ast Group) {
        visit_group(self, node);
    }

    /// Visits a leaf declaration (field, option, import, ...).
    fn visit_leaf(&mut self, node: &'ast Element) {}
}

/// Walks every top-level element of `node`.
pub fn visit_file<'ast, V>(v: &mut V, node: &'ast ProtoFile)
where
    V: Visit<'ast> + ?Sized,
{
    for element in &node.elements {
        v.visit_element(element);
    }
}

/// Dispatches `node` to the matching `visit_*` method.
pub fn visit_element<'ast, V>(v: &mut V, node: &'ast Element)
where
    V: Visit<'ast> + ?Sized,
{
    match node {
        Element::Message(message) => v.visit_message(message),
        Element::Service(service) => v.visit_service(service),
        Element::Rpc(rpc) => v.visit_rpc(rpc),
        Element::Enum(enumeration) => v.visit_enum(enumeration),
        Element::Oneof(oneof) => v.visit_oneof(oneof),
        Element::Group(group) => v.visit_group(group),
        Element::Syntax(_)
        | Element::Package(_)
        | Element::Import(_)
        | Element::Option(_)
        | Element::EnumValue(_)
        | Element::Field(_)
        | Element::MapField(_)
        | Element::Reserved(_)
        | Element::Extensions(_) => v.visit_leaf(node),
    }
}

/// Walks the children of a message.
pub fn visit_message<'ast, V>(v: &mut V, node: &'ast Message)
where
    V: Visit<'ast> + ?Sized,
{
    for element in &node.elements {
        v.visit_element(element);
    }
}

/// Walks the children of a service.
pub fn visit_service<'ast, V>(v: &mut V, node: &'ast Service)
where
    V: Visit<'ast> + ?Sized,
{
    for element in &node.elements {
        v.visit_element(element);
    }
}

/// Walks the children of an enum.
pub fn visit_enum<'ast, V>(v: &mut V, node: &'ast Enum)
where
    V: Visit<'ast> + ?Sized,
{
    for element in &node.elements {
        v.visit_element(element);
    }
}

/// Walks the children of a oneof.
pub fn visit_oneof<'ast, V>(v: &mut V, node: &'ast Oneof)
where
    V: Visit<'ast> + ?Sized,
{
    for element in &node.elements {
        v.visit_element(element);
    }
}

/// Walks the body of a group.
pub fn visit_group<'ast, V>(v: &mut V, node: &'ast Group)
where
    V: Visit<'ast> + ?Sized,
{
    for element in &node.elements {
        v.visit_element(element);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    /// Records enter/exit events to check traversal order.
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl<'ast> Visit<'ast> for Recorder {
        fn visit_message(&mut self, node: &'ast Message) {
            self.events.push(format!("enter {}", node.name));
            visit_message(self, node);
            self.events.push(format!("exit {}", node.name));
        }

        fn visit_rpc(&mut self, node: &'ast Rpc) {
            self.events.push(format!("rpc {}", node.name));
        }

        fn visit_leaf(&mut self, node: &'ast Element) {
            if let Element::Field(field) = node {
                self.events.push(format!("field {}", field.name));
            }
        }
    }

    #[test]
    fn exit_fires_after_children() {
        let file = parse(
            r"
message A {
  message B {
    message C { int32 x = 1; }
  }
  int32 y = 2;
}
service S { rpc Go(A) returns (A); }
",
        )
        .unwrap();

        let mut recorder = Recorder::default();
        recorder.visit_file(&file);

        assert_eq!(
            recorder.events,
            vec![
                "enter A", "enter B", "enter C", "field x", "exit C", "exit B", "field y",
                "exit A", "rpc Go",
            ]
        );
    }

    #[test]
    fn group_bodies_are_walked_by_default() {
        let file = parse(
            r#"
syntax = "proto2";
message A {
  optional group Result = 1 {
    optional string url = 2;
  }
}
"#,
        )
        .unwrap();

        let mut recorder = Recorder::default();
        recorder.visit_file(&file);

        assert_eq!(recorder.events, vec!["enter A", "field url", "exit A"]);
    }

    #[test]
    fn counts_rpcs_across_services() {
        struct CountRpcs(usize);
        impl<'ast> Visit<'ast> for CountRpcs {
            fn visit_rpc(&mut self, _node: &'ast Rpc) {
                self.0 += 1;
            }
        }

        let file = parse(
            "service A { rpc X(R) returns (R); rpc Y(R) returns (R); }\nservice B { rpc Z(R) returns (R); }\n",
        )
        .unwrap();
        let mut counter = CountRpcs(0);
        counter.visit_file(&file);
        assert_eq!(counter.0, 3);
    }
}
