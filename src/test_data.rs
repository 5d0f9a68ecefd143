#[cfg(test)]
pub const BLOGGER_EXPORT: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<feed xmlns='http://www.w3.org/2005/Atom' xmlns:app='http://purl.org/atom/app#' xmlns:thr='http://purl.org/syndication/thread/1.0'>
<id>tag:blogger.com,1999:blog-42</id>
<title type='text'>My blog</title>
<entry>
  <id>tag:blogger.com,1999:blog-42.settings.BLOG_NAME</id>
  <category scheme='http://schemas.google.com/g/2005#kind' term='http://schemas.google.com/blogger/2008/kind#settings'/>
  <title type='text'>Blog name</title>
  <content type='text'>My blog</content>
</entry>
<entry>
  <id>tag:blogger.com,1999:blog-42.post-1001</id>
  <published>2011-04-05T21:13:00.001-07:00</published>
  <category scheme='http://schemas.google.com/g/2005#kind' term='http://schemas.google.com/blogger/2008/kind#post'/>
  <category scheme='http://www.blogger.com/atom/ns#' term='rust'/>
  <category scheme='http://www.blogger.com/atom/ns#' term='xml'/>
  <category scheme='http://www.blogger.com/atom/ns#' term='rust'/>
  <title type='text'>Hello World</title>
  <content type='html'>&lt;p&gt;My &lt;b&gt;first&lt;/b&gt; post&lt;/p&gt;</content>
  <link rel='replies' type='text/html' href='http://myblog.blogspot.com/2011/04/hello-world.html#comment-form' title='2 Comments'/>
  <link rel='alternate' type='text/html' href='http://myblog.blogspot.com/2011/04/hello-world.html' title='Hello World'/>
  <author><name>Owner</name><email>noreply@blogger.com</email></author>
</entry>
<entry>
  <id>tag:blogger.com,1999:blog-42.post-1002</id>
  <published>2012-01-01T10:00:00.000+01:00</published>
  <category scheme='http://schemas.google.com/g/2005#kind' term='http://schemas.google.com/blogger/2008/kind#post'/>
  <title type='text'>Bob's draft</title>
  <content type='html'>&lt;p&gt;Not ready&lt;/p&gt;</content>
  <app:control><app:draft>yes</app:draft></app:control>
</entry>
<entry>
  <id>tag:blogger.com,1999:blog-42.post-2001</id>
  <published>2011-04-06T08:00:00.000-07:00</published>
  <category scheme='http://schemas.google.com/g/2005#kind' term='http://schemas.google.com/blogger/2008/kind#comment'/>
  <title type='text'>Nice</title>
  <content type='html'>Nice post!</content>
  <author><name>Ann</name><uri>http://ann.example.com</uri><email>noreply@blogger.com</email></author>
  <thr:in-reply-to ref='tag:blogger.com,1999:blog-42.post-1001' source='http://www.blogger.com/feeds/42/posts/default/1001' type='text/html'/>
</entry>
<entry>
  <id>tag:blogger.com,1999:blog-42.post-2002</id>
  <published>2011-04-07T08:00:00.000-07:00</published>
  <title type='text'></title>
  <content type='html'>Thanks &lt;i&gt;a lot&lt;/i&gt;</content>
  <author><name>Bob</name><email>bob@example.com</email></author>
  <thr:in-reply-to ref='tag:blogger.com,1999:blog-42.post-1001' source='http://www.blogger.com/feeds/42/posts/default/1001' type='text/html'/>
</entry>
<entry>
  <id>tag:blogger.com,1999:blog-42.post-2003</id>
  <published>2011-04-08T08:00:00.000-07:00</published>
  <title type='text'>Lost</title>
  <content type='html'>Where is my post?</content>
  <author><name>Carl</name></author>
  <thr:in-reply-to ref='tag:blogger.com,1999:blog-42.post-9999' source='http://www.blogger.com/feeds/42/posts/default/9999' type='text/html'/>
</entry>
</feed>
"#;

#[cfg(test)]
pub const WORDPRESS_EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<rss version="2.0"
	xmlns:excerpt="http://wordpress.org/export/1.2/excerpt/"
	xmlns:content="http://purl.org/rss/1.0/modules/content/"
	xmlns:dc="http://purl.org/dc/elements/1.1/"
	xmlns:wp="http://wordpress.org/export/1.2/">
<channel>
	<title>My WordPress blog</title>
	<wp:wxr_version>1.2</wp:wxr_version>
	<item>
		<title>Fish &amp; Chips</title>
		<pubDate>Tue, 02 Jan 2018 05:06:07 +0000</pubDate>
		<dc:creator><![CDATA[admin]]></dc:creator>
		<content:encoded><![CDATA[First paragraph

Second paragraph with <a href="https://example.com">a link</a>]]></content:encoded>
		<wp:post_id>11</wp:post_id>
		<wp:post_date><![CDATA[2018-01-02 05:06:07]]></wp:post_date>
		<wp:post_name><![CDATA[fish-%26-chips]]></wp:post_name>
		<wp:status><![CDATA[publish]]></wp:status>
		<wp:post_type><![CDATA[post]]></wp:post_type>
		<category domain="category" nicename="food"><![CDATA[Food]]></category>
		<category domain="post_tag" nicename="uk"><![CDATA[UK]]></category>
		<wp:comment>
			<wp:comment_id>1</wp:comment_id>
			<wp:comment_author><![CDATA[Ann]]></wp:comment_author>
			<wp:comment_author_email><![CDATA[ann@example.com]]></wp:comment_author_email>
			<wp:comment_author_url>http://ann.example.com</wp:comment_author_url>
			<wp:comment_date><![CDATA[2018-01-03 10:00:00]]></wp:comment_date>
			<wp:comment_content><![CDATA[Yum <b>yum</b>]]></wp:comment_content>
			<wp:comment_approved><![CDATA[1]]></wp:comment_approved>
		</wp:comment>
		<wp:comment>
			<wp:comment_id>2</wp:comment_id>
			<wp:comment_author><![CDATA[Spammer]]></wp:comment_author>
			<wp:comment_date><![CDATA[2018-01-03 11:00:00]]></wp:comment_date>
			<wp:comment_content><![CDATA[Buy now]]></wp:comment_content>
			<wp:comment_approved><![CDATA[spam]]></wp:comment_approved>
		</wp:comment>
		<wp:comment>
			<wp:comment_id>3</wp:comment_id>
			<wp:comment_author><![CDATA[Pending]]></wp:comment_author>
			<wp:comment_date><![CDATA[2018-01-03 12:00:00]]></wp:comment_date>
			<wp:comment_content><![CDATA[Hmm]]></wp:comment_content>
			<wp:comment_approved><![CDATA[0]]></wp:comment_approved>
		</wp:comment>
		<wp:comment>
			<wp:comment_id>4</wp:comment_id>
			<wp:comment_author><![CDATA[Bob]]></wp:comment_author>
			<wp:comment_date><![CDATA[2018-01-04 10:00:00]]></wp:comment_date>
			<wp:comment_content><![CDATA[Agreed]]></wp:comment_content>
			<wp:comment_approved><![CDATA[1]]></wp:comment_approved>
		</wp:comment>
	</item>
	<item>
		<title>Work in progress</title>
		<pubDate>Mon, 30 Nov -0001 00:00:00 +0000</pubDate>
		<content:encoded><![CDATA[<p>Draft body</p>]]></content:encoded>
		<wp:post_id>12</wp:post_id>
		<wp:post_date><![CDATA[2018-02-01 09:30:00]]></wp:post_date>
		<wp:post_name><![CDATA[]]></wp:post_name>
		<wp:status><![CDATA[draft]]></wp:status>
		<wp:post_type><![CDATA[post]]></wp:post_type>
	</item>
	<item>
		<title>Secret</title>
		<content:encoded><![CDATA[<p>Hidden</p>]]></content:encoded>
		<wp:post_id>13</wp:post_id>
		<wp:post_name><![CDATA[secret]]></wp:post_name>
		<wp:status><![CDATA[private]]></wp:status>
		<wp:post_type><![CDATA[post]]></wp:post_type>
	</item>
	<item>
		<title>Inherited post</title>
		<content:encoded><![CDATA[<p>Belongs to another post</p>]]></content:encoded>
		<wp:post_id>16</wp:post_id>
		<wp:post_name><![CDATA[inherited-post]]></wp:post_name>
		<wp:status><![CDATA[inherit]]></wp:status>
		<wp:post_type><![CDATA[post]]></wp:post_type>
	</item>
	<item>
		<title>photo.jpg</title>
		<wp:post_id>14</wp:post_id>
		<wp:post_name><![CDATA[photo]]></wp:post_name>
		<wp:status><![CDATA[inherit]]></wp:status>
		<wp:post_type><![CDATA[attachment]]></wp:post_type>
	</item>
	<item>
		<title>Home</title>
		<wp:post_id>15</wp:post_id>
		<wp:post_name><![CDATA[home]]></wp:post_name>
		<wp:status><![CDATA[publish]]></wp:status>
		<wp:post_type><![CDATA[nav_menu_item]]></wp:post_type>
	</item>
</channel>
</rss>
"#;
