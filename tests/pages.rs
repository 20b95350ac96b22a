mod support;

use inkpost::application::pages::PageError;
use inkpost::application::repos::RepoError;
use inkpost::presentation::views::PageContext;
use support::MemoryBlog;

fn keys<C: PageContext>(context: &C) -> Vec<String> {
    let mut keys: Vec<String> = context
        .context_map()
        .expect("context serializes")
        .keys()
        .cloned()
        .collect();
    keys.sort();
    keys
}

#[tokio::test]
async fn home_page_ranks_posts_and_tags() {
    let mut blog = MemoryBlog::new();
    let author = blog.author("mira");
    let readers: Vec<_> = (0..6).map(|i| blog.author(&format!("reader{i}"))).collect();

    let mut ids = Vec::new();
    for minute in 0..7 {
        ids.push(blog.post(&author, &format!("post-{minute}"), &format!("Post {minute}"), minute));
    }
    // post-0 is the oldest but the most liked.
    for reader in &readers {
        blog.like(ids[0], reader);
    }
    for reader in &readers[..3] {
        blog.like(ids[3], reader);
    }
    blog.like(ids[5], &readers[0]);

    let rust = blog.tag("Rust");
    let web = blog.tag("web");
    let solo = blog.tag("solo");
    for id in &ids[..4] {
        blog.tag_post(*id, &rust);
    }
    blog.tag_post(ids[4], &web);
    blog.tag_post(ids[5], &web);
    blog.tag_post(ids[6], &solo);

    let page = blog.into_service().home_page().await.expect("home page");

    let popular: Vec<&str> = page
        .most_popular_posts
        .iter()
        .map(|post| post.slug.as_str())
        .collect();
    assert_eq!(popular.len(), 5);
    assert_eq!(&popular[..3], ["post-0", "post-3", "post-5"]);

    let fresh: Vec<&str> = page.page_posts.iter().map(|post| post.slug.as_str()).collect();
    assert_eq!(fresh, ["post-6", "post-5", "post-4", "post-3", "post-2"]);

    let tags: Vec<(&str, u64)> = page
        .popular_tags
        .iter()
        .map(|tag| (tag.title.as_str(), tag.posts_with_tag))
        .collect();
    assert_eq!(tags, [("rust", 4), ("web", 2), ("solo", 1)]);

    assert_eq!(
        keys(&page),
        ["most_popular_posts", "page_posts", "popular_tags"]
    );
}

#[tokio::test]
async fn home_page_on_empty_store_is_empty() {
    let page = MemoryBlog::new()
        .into_service()
        .home_page()
        .await
        .expect("home page");

    assert!(page.most_popular_posts.is_empty());
    assert!(page.page_posts.is_empty());
    assert!(page.popular_tags.is_empty());
}

#[tokio::test]
async fn summaries_carry_counts_teaser_and_representative_tag() {
    let mut blog = MemoryBlog::new();
    let author = blog.author("mira");
    let reader = blog.author("leo");
    let post = blog.post(&author, "long-read", "Long read", 0);
    blog.set_text(post, &"a".repeat(250));
    blog.comment(post, &reader, "first", 1);
    blog.comment(post, &reader, "second", 2);

    let rust = blog.tag("rust");
    let async_tag = blog.tag("async");
    blog.tag_post(post, &rust);
    blog.tag_post(post, &async_tag);

    let page = blog.into_service().home_page().await.expect("home page");
    let summary = &page.page_posts[0];

    assert_eq!(summary.teaser_text, "a".repeat(200));
    assert_eq!(summary.comments_amount, 2);
    assert_eq!(summary.author, "mira");
    assert_eq!(summary.image_url, None);

    let tag = summary.tags.as_ref().expect("representative tag");
    assert_eq!(tag.title, "async");
    assert_eq!(tag.posts_with_tag, 1);
    assert_eq!(summary.first_tag_title.as_deref(), Some("async"));
}

#[tokio::test]
async fn untagged_post_has_no_tag_and_image_resolves_to_media() {
    let mut blog = MemoryBlog::new();
    let author = blog.author("mira");
    let post = blog.post(&author, "pictured", "Pictured", 0);
    blog.set_image(post, "posts/harbour.jpg");

    let page = blog.into_service().home_page().await.expect("home page");
    let summary = &page.page_posts[0];

    assert!(summary.tags.is_none());
    assert!(summary.first_tag_title.is_none());
    assert_eq!(summary.image_url.as_deref(), Some("/media/posts/harbour.jpg"));
}

#[tokio::test]
async fn post_detail_counts_distinct_likers() {
    let mut blog = MemoryBlog::new();
    let author = blog.author("mira");
    let post = blog.post(&author, "liked", "Liked", 0);
    let likers: Vec<_> = ["a", "b", "c"].iter().map(|name| blog.author(name)).collect();
    for liker in &likers {
        blog.like(post, liker);
    }
    blog.like(post, &likers[0]);

    let page = blog
        .into_service()
        .post_detail_page("liked")
        .await
        .expect("detail page");

    assert_eq!(page.post.likes_amount, 3);
    assert_eq!(page.post.title, "Liked");
    assert_eq!(
        keys(&page),
        ["most_popular_posts", "popular_tags", "post"]
    );
}

#[tokio::test]
async fn post_detail_lists_comments_oldest_first() {
    let mut blog = MemoryBlog::new();
    let author = blog.author("mira");
    let reader = blog.author("leo");
    let post = blog.post(&author, "talk", "Talk", 0);
    blog.comment(post, &reader, "later", 30);
    blog.comment(post, &reader, "earlier", 10);
    blog.comment(post, &author, "middle", 20);

    let page = blog
        .into_service()
        .post_detail_page("talk")
        .await
        .expect("detail page");

    let texts: Vec<&str> = page
        .post
        .comments
        .iter()
        .map(|comment| comment.text.as_str())
        .collect();
    assert_eq!(texts, ["earlier", "middle", "later"]);
    assert_eq!(page.post.comments[1].author, "mira");
}

#[tokio::test]
async fn post_detail_unknown_slug_is_not_found() {
    let err = MemoryBlog::new()
        .into_service()
        .post_detail_page("missing")
        .await
        .expect_err("unknown slug");

    assert!(matches!(err, PageError::NotFound { entity: "post" }));
}

#[tokio::test]
async fn post_detail_shared_slug_is_ambiguous() {
    let mut blog = MemoryBlog::new();
    let author = blog.author("mira");
    blog.post(&author, "twin", "Twin one", 0);
    blog.post(&author, "twin", "Twin two", 1);

    let err = blog
        .into_service()
        .post_detail_page("twin")
        .await
        .expect_err("shared slug");

    assert!(matches!(
        err,
        PageError::AmbiguousMatch { ref slug, matches: 2 } if slug == "twin"
    ));
}

#[tokio::test]
async fn tag_filter_page_unknown_tag_is_not_found() {
    let mut blog = MemoryBlog::new();
    blog.tag("python");

    let err = blog
        .into_service()
        .tag_filter_page("nonexistent")
        .await
        .expect_err("unknown tag");

    assert!(matches!(err, PageError::NotFound { entity: "tag" }));
}

#[tokio::test]
async fn tag_filter_page_matches_titles_exactly() {
    let mut blog = MemoryBlog::new();
    blog.tag("Python");
    let service = blog.into_service();

    assert!(service.tag_filter_page("python").await.is_ok());
    assert!(matches!(
        service.tag_filter_page("Python").await,
        Err(PageError::NotFound { .. })
    ));
}

#[tokio::test]
async fn tag_filter_page_lists_at_most_twenty_newest_posts() {
    let mut blog = MemoryBlog::new();
    let author = blog.author("mira");
    let python = blog.tag("python");
    let other = blog.tag("other");
    for minute in 0..25 {
        let id = blog.post(&author, &format!("py-{minute}"), "Python post", minute);
        blog.tag_post(id, &python);
    }
    let untagged = blog.post(&author, "elsewhere", "Elsewhere", 100);
    blog.tag_post(untagged, &other);

    let page = blog
        .into_service()
        .tag_filter_page("python")
        .await
        .expect("tag page");

    assert_eq!(page.tag, "python");
    assert_eq!(page.posts.len(), 20);
    assert_eq!(page.posts[0].slug, "py-24");
    assert_eq!(page.posts[19].slug, "py-5");
    assert!(page.posts.iter().all(|post| post.slug != "elsewhere"));
    assert_eq!(
        keys(&page),
        ["most_popular_posts", "popular_tags", "posts", "tag"]
    );
}

#[tokio::test]
async fn contacts_page_has_empty_context() {
    let page = MemoryBlog::new().into_service().contacts_page();
    assert!(keys(&page).is_empty());
}

#[tokio::test]
async fn store_failures_surface_as_repo_errors() {
    let err = MemoryBlog::failing()
        .into_service()
        .home_page()
        .await
        .expect_err("failing store");

    assert!(matches!(err, PageError::Repo(RepoError::Persistence(_))));
}
