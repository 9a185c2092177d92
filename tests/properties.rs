use csvi::printer::{real_repr, string_repr};
use csvi::reader::{read_str, Parser};
use csvi::source::StrSource;
use csvi::tokens::Lexer;
use csvi::{Expression, Interpreter};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Tree {
    Leaf(i64),
    Node(Vec<Tree>),
}

impl Tree {
    fn render(&self) -> String {
        match self {
            Tree::Leaf(value) => value.to_string(),
            Tree::Node(children) => {
                let inner: Vec<String> = children.iter().map(Tree::render).collect();
                format!("( {} )", inner.join(" "))
            }
        }
    }

    fn to_expression(&self) -> Expression {
        match self {
            Tree::Leaf(value) => Expression::Integer(*value),
            Tree::Node(children) => {
                Expression::wrap_list(children.iter().map(Tree::to_expression).collect())
            }
        }
    }
}

fn small_i64() -> impl Strategy<Value = i64> {
    -1_000_000i64..1_000_000i64
}

fn non_zero_i64() -> impl Strategy<Value = i64> {
    small_i64().prop_filter("Must be non-zero", |x| *x != 0)
}

fn atom() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z][a-zA-Z0-9_]{0,12}",
        "[=*/^.$][a-zA-Z0-9_]{0,12}",
        "[+-]([a-zA-Z_][a-zA-Z0-9_]{0,12})?",
    ]
}

fn tree() -> impl Strategy<Value = Tree> {
    small_i64().prop_map(Tree::Leaf).prop_recursive(6, 64, 6, |inner| {
        prop::collection::vec(inner, 0..6).prop_map(Tree::Node)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn list_duality(values in prop::collection::vec(small_i64(), 0..32)) {
        let elements: Vec<Expression> = values.iter().copied().map(Expression::Integer).collect();
        let list = Expression::wrap_list(elements.clone());

        prop_assert!(list.is_proper_list());
        prop_assert_eq!(list.length(), values.len());
        prop_assert_eq!(list.iter().collect::<Vec<_>>(), elements);
        prop_assert_eq!(list.is_nil(), values.is_empty());
    }

    #[test]
    fn balanced_nesting_reads_as_one_form(tree in tree()) {
        let text = tree.render();
        let mut parser = Parser::new(Lexer::new(StrSource::new(&text))).unwrap();

        prop_assert!(parser.has_next());
        let expr = parser.parse_next().unwrap();
        prop_assert!(!parser.has_next());
        prop_assert_eq!(expr, tree.to_expression());
    }

    #[test]
    fn addition_matches_host_arithmetic(a in small_i64(), b in small_i64()) {
        let mut interpreter = Interpreter::new().unwrap();
        let result = interpreter.process(&format!("(+ {} {})", a, b)).unwrap();
        prop_assert_eq!(result, Expression::Integer(a + b));
    }

    #[test]
    fn integer_division_truncates(a in small_i64(), b in non_zero_i64()) {
        let mut interpreter = Interpreter::new().unwrap();
        let result = interpreter.process(&format!("(/ {} {})", a, b)).unwrap();
        prop_assert_eq!(result, Expression::Integer(a / b));
    }

    #[test]
    fn strings_read_back(text in any::<String>()) {
        prop_assert_eq!(read_str(&string_repr(&text)).unwrap(), Expression::string(&text));
    }

    #[test]
    fn atoms_read_back(name in atom()) {
        prop_assert_eq!(read_str(&name).unwrap(), Expression::symbol(&name));
    }

    #[test]
    fn integers_read_back(value in any::<i64>()) {
        prop_assert_eq!(read_str(&value.to_string()).unwrap(), Expression::Integer(value));
    }

    #[test]
    fn reals_read_back(value in any::<f64>().prop_filter("Must be finite", |r| r.is_finite())) {
        let rendered = Expression::Real(value).to_string();
        prop_assert_eq!(&rendered, &real_repr(value));
        prop_assert_eq!(read_str(&rendered).unwrap(), Expression::Real(value));
    }
}
