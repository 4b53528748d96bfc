//! Join parenthesization through the full rewriter.

mod common;
use common::*;

use jet_sql_core::RewriteError;

#[test]
fn join_chain_is_parenthesized() {
    assert_eq!(
        rewrite("SELECT * FROM A JOIN B ON A.id=B.id JOIN C ON B.id=C.id"),
        "SELECT * FROM (A JOIN B ON A.id=B.id) JOIN C ON B.id=C.id"
    );
}

#[test]
fn four_way_join_with_where_and_order() {
    assert_eq!(
        rewrite(
            "select o.id from Orders o inner join Customers c on o.cid = c.id \
             left outer join Items i on i.oid = o.id left join Products p on p.id = i.pid \
             where c.name = 'x' order by o.id"
        ),
        "select o.id from ((Orders o inner join Customers c on o.cid = c.id) \
         left outer join Items i on i.oid = o.id) left join Products p on p.id = i.pid \
         where c.name = 'x' order by o.id"
    );
}

#[test]
fn only_the_joined_block_is_wrapped() {
    assert_eq!(
        rewrite("select * from A, B join C on B.id = C.id, D where A.id = D.id"),
        "select * from A, (select * from B join C on B.id = C.id) as alias1, D where A.id = D.id"
    );
}

#[test]
fn correlated_subquery_gets_its_own_parentheses() {
    assert_eq!(
        rewrite(
            "select a.x from A a join B b on a.id = b.id join C c on b.id = c.id \
             where a.y in (select d.y from D d join E e on d.id = e.id join F f on e.id = f.id \
             where d.z = a.z)"
        ),
        "select a.x from (A a join B b on a.id = b.id) join C c on b.id = c.id \
         where a.y in (select d.y from (D d join E e on d.id = e.id) join F f on e.id = f.id \
         where d.z = a.z)"
    );
}

#[test]
fn derived_table_in_from() {
    assert_eq!(
        rewrite(
            "select * from (select * from X join Y on X.id = Y.id join Z on Y.id = Z.id) t \
             join W on t.id = W.id"
        ),
        "select * from (select * from (X join Y on X.id = Y.id) join Z on Y.id = Z.id) t \
         join W on t.id = W.id"
    );
}

#[test]
fn union_branches_are_left_alone() {
    let sql = "select a from A join B on A.id = B.id join C on B.id = C.id \
               union all select a from D";
    assert_eq!(rewrite(sql), sql);
}

#[test]
fn rewritten_joins_are_a_fixed_point() {
    let once = rewrite("select * from A join B on A.i = B.i join C on B.i = C.i join D on C.i = D.i");
    assert_eq!(
        once,
        "select * from ((A join B on A.i = B.i) join C on B.i = C.i) join D on C.i = D.i"
    );
    assert_eq!(rewrite(&once), once);
}

#[test]
fn trailing_join_is_a_syntax_error() {
    assert!(matches!(
        rewrite_err("select * from A join B on A.id = B.id join"),
        RewriteError::Syntax { .. }
    ));
}

#[test]
fn unsupported_join_types_are_syntax_errors() {
    for sql in [
        "select * from A full outer join B on A.id = B.id",
        "select * from A cross join B",
        "select * from A join B where A.id = 1",
        "select * from A outer join B on A.id = B.id",
    ] {
        assert!(
            matches!(rewrite_err(sql), RewriteError::Syntax { .. }),
            "{sql} should be rejected"
        );
    }
}
